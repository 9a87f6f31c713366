//! Command-line interface for pysummary.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analysis::{registered_extensions, AnalysisContext};
use crate::config::{self, Config, DEFAULT_CONFIG_NAMES};
use crate::discover;
use crate::report;
use crate::search::{self, SearchOptions};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Summarize the functions of a Python source tree.
///
/// For every function definition, nested ones included, pysummary records
/// its name, parameters, docstring, verbatim source and syntax tree, and
/// writes them as summary, snippet and tree views.
#[derive(Parser)]
#[command(name = "pysummary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log progress details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// When to use terminal colors
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorMode,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract function summaries, snippets and trees
    #[command(visible_alias = "run")]
    Summarize(SummarizeArgs),
    /// Search source files for a pattern
    Search(SearchArgs),
    /// Create a pysummary.yaml with default settings
    Init(InitArgs),
}

/// Terminal color policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Arguments for the summarize command.
#[derive(Parser)]
pub struct SummarizeArgs {
    /// Directory or file to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Directory to write the view files into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write all views into this single file
    #[arg(long)]
    pub combined: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Exit non-zero when any file was skipped
    #[arg(long)]
    pub strict: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the search command.
#[derive(Parser)]
pub struct SearchArgs {
    /// Regular expression to search for
    pub pattern: String,

    /// Directory or file to search
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Match case-insensitively
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Treat the pattern as a literal string
    #[arg(short = 'F', long)]
    pub fixed_strings: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "pysummary.yaml")]
    pub output: PathBuf,
}

/// Default config written by `init`.
const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Apply the color policy to `colored` output.
pub fn init_color(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {
            if !io::stdout().is_terminal() || std::env::var_os("NO_COLOR").is_some() {
                colored::control::set_override(false);
            }
        }
    }
}

/// Load, validate and report a config. Errors are printed; `None` means the
/// caller should exit with [`EXIT_ERROR`].
fn load_config(explicit: Option<&Path>) -> Option<Config> {
    let config = match config::load(explicit) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return None;
        }
    };
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return None;
    }
    Some(config)
}

/// Resolve the input path to (base directory, files to process).
fn resolve_inputs(path: &Path, config: &Config) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
    let abs_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", path, e))?;
    let metadata = std::fs::metadata(&abs_path)?;

    if metadata.is_dir() {
        let files = discover::collect_files(&abs_path, config)?;
        Ok((abs_path, files))
    } else {
        let base = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone());
        Ok((base, vec![abs_path]))
    }
}

/// Configured extensions with no analyzer of their own.
fn unregistered_extensions(config: &Config) -> Vec<String> {
    let registered = registered_extensions();
    config
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !registered.contains(e))
        .collect()
}

fn progress_bar(len: usize) -> Option<ProgressBar> {
    if !io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}") {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(e) => debug!("progress template: {}", e),
    }
    bar.set_message("files");
    Some(bar)
}

/// Run the summarize command.
pub fn run_summarize(args: &SummarizeArgs) -> anyhow::Result<i32> {
    crate::init();

    if args.format != "text" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'text' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let Some(mut config) = load_config(args.config.as_deref()) else {
        return Ok(EXIT_ERROR);
    };

    // Command-line flags override file values
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(name) = &args.combined {
        config.output.combined_file = Some(name.clone());
    }
    if let Err(e) = config::validate(&config) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }
    for ext in unregistered_extensions(&config) {
        info!("no dedicated analyzer for .{}, parsing it as Python", ext);
    }

    let (base_dir, files) = match resolve_inputs(&args.path, &config) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if files.is_empty() {
        warn!("no source files found under {}", args.path.display());
    }

    let mut context = AnalysisContext::new(&base_dir).jobs(config.jobs);
    if !args.no_progress && args.format == "text" {
        if let Some(bar) = progress_bar(files.len()) {
            context = context.progress(bar);
        }
    }
    let result = context.analyze_files(&files)?;

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => {
            report::write_json(&path_str, &result)?;
        }
        _ => {
            let written = report::write_views(&result, &config.output)?;
            report::write_pretty(&path_str, &result, &written);
            report::write_failures(&result.failures);
        }
    }

    if args.strict && result.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the search command.
pub fn run_search(args: &SearchArgs) -> anyhow::Result<i32> {
    let options = SearchOptions {
        ignore_case: args.ignore_case,
        fixed_strings: args.fixed_strings,
    };
    let regex = match search::build_regex(&args.pattern, options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let Some(config) = load_config(args.config.as_deref()) else {
        return Ok(EXIT_ERROR);
    };

    let (base_dir, files) = match resolve_inputs(&args.path, &config) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let results = search::search_files(&base_dir, &files, &regex);
    search::write_matches(&results);

    if results.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    if DEFAULT_CONFIG_NAMES.iter().any(|n| args.output == Path::new(n)) {
        println!("  2. Run: pysummary summarize .");
    } else {
        println!(
            "  2. Run: pysummary summarize . --config {}",
            args.output.display()
        );
    }

    Ok(EXIT_SUCCESS)
}
