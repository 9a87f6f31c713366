//! Output formatting for analysis results.
//!
//! Supports these views, all pure formatting over an [`AnalysisResult`]:
//! - Summary: one line per function (name, arity, parameters, docstring)
//! - Snippets: verbatim source text per function
//! - ASTs: tree dump per function
//! - JSON: structured output for programmatic consumption
//!
//! Plus a colored terminal overview and skipped-file listing.

use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisResult, FileFailure, FileReport, DUMP_FORMAT_VERSION};
use crate::config::OutputConfig;

/// Placeholder used when a function has no docstring.
pub const NO_DOCSTRING: &str = "No docstring available.";

/// Placeholder used when a function's source span could not be sliced.
pub const NO_SOURCE: &str = "<source unavailable>";

// =============================================================================
// Text views
// =============================================================================

/// One line per function: name, parameter count, parameters and docstring.
pub fn render_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for report in &result.files {
        write_file_header(&mut out, report);
        for func in &report.functions {
            let _ = writeln!(
                out,
                " - Function '{}' takes {} arguments: {}. {}",
                func.name,
                func.arity(),
                func.parameters.join(", "),
                indent_continuation(func.docstring_text().unwrap_or(NO_DOCSTRING))
            );
        }
    }
    if result.has_failures() {
        out.push('\n');
        out.push_str(&render_failures(&result.failures));
    }
    out
}

/// Indent every line after the first so a multi-line docstring stays inside
/// its function entry.
fn indent_continuation(text: &str) -> String {
    text.replace('\n', "\n   ")
}

/// Verbatim source text per function.
pub fn render_snippets(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for report in &result.files {
        write_file_header(&mut out, report);
        for func in &report.functions {
            let _ = writeln!(
                out,
                "\nFunction: {}\nCode:\n{}",
                func.name,
                func.source_text.as_deref().unwrap_or(NO_SOURCE)
            );
        }
    }
    out
}

/// Tree dump per function.
pub fn render_asts(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for report in &result.files {
        write_file_header(&mut out, report);
        for func in &report.functions {
            let _ = writeln!(out, "\nFunction: {}\nAST: {}", func.name, func.tree_dump);
        }
    }
    out
}

/// All three views in one document.
pub fn render_combined(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("=== Function Summaries ===\n");
    out.push_str(&render_summary(result));
    out.push_str("\n=== Code Snippets ===\n");
    out.push_str(&render_snippets(result));
    out.push_str("\n=== Abstract Syntax Trees (ASTs) ===\n");
    out.push_str(&render_asts(result));
    out
}

/// Listing of skipped files with reasons.
pub fn render_failures(failures: &[FileFailure]) -> String {
    let mut out = String::from("Skipped files:\n");
    for failure in failures {
        let _ = writeln!(out, " - {}: {}: {}", failure.file, failure.kind, failure.message);
    }
    out
}

fn write_file_header(out: &mut String, report: &FileReport) {
    let _ = writeln!(out, "\nFile: {}", report.file);
}

/// Write the configured views to disk and return the written paths.
pub fn write_views(result: &AnalysisResult, output: &OutputConfig) -> anyhow::Result<Vec<PathBuf>> {
    let dir = &output.directory;
    if !dir.as_os_str().is_empty() && dir.as_path() != Path::new(".") {
        fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("creating {}: {}", dir.display(), e))?;
    }

    let views: Vec<(PathBuf, String)> = match &output.combined_file {
        Some(name) => vec![(dir.join(name), render_combined(result))],
        None => vec![
            (dir.join(&output.summary_file), render_summary(result)),
            (dir.join(&output.snippets_file), render_snippets(result)),
            (dir.join(&output.ast_file), render_asts(result)),
        ],
    };

    let mut written = Vec::with_capacity(views.len());
    for (path, content) in views {
        fs::write(&path, content)
            .map_err(|e| anyhow::anyhow!("writing {}: {}", path.display(), e))?;
        tracing::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: String,
    pub dump_format_version: u32,
    pub path: String,
    pub files_scanned: usize,
    pub function_count: usize,
    pub files: &'a [FileReport],
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub failures: &'a [FileFailure],
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl<'a> JsonReport<'a> {
    pub fn new(path: &str, result: &'a AnalysisResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dump_format_version: DUMP_FORMAT_VERSION,
            path: path.to_string(),
            files_scanned: result.scanned,
            function_count: result.function_count(),
            files: &result.files,
            failures: &result.failures,
        }
    }
}

/// Write results in JSON format to stdout.
pub fn write_json(path: &str, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::new(path, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Terminal output
// =============================================================================

/// Colored run overview on stdout.
pub fn write_pretty(path: &str, result: &AnalysisResult, written: &[PathBuf]) {
    println!();
    print!("  ");
    print!("{}", "pysummary".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanned:   ".dimmed());
    println!("{} ({} files)", path, result.scanned);
    print!("  {}", "Functions: ".dimmed());
    println!("{}", result.function_count().to_string().bold());
    println!();

    if !written.is_empty() {
        println!("  {}", "Wrote:".dimmed());
        for file in written {
            println!("    {}", file.display());
        }
        println!();
    }

    if result.has_failures() {
        let status = format!("{} file(s) skipped", result.failures.len());
        println!("  {}", status.yellow().bold());
    } else {
        println!("  {}", "All files processed".green().bold());
    }
    println!();
}

/// Skipped-file listing on stderr.
pub fn write_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{}", "Skipped files:".yellow().bold());
    for failure in failures {
        eprintln!(
            "  {} {} {}",
            failure.file.bold(),
            format!("({})", failure.kind).dimmed(),
            failure.message
        );
    }
}
