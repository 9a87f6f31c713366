//! Configuration file schema for pysummary.
//!
//! Every key is optional; command-line flags override file values.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["pysummary.yaml", ".pysummary.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// File extensions to analyze, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to exclude (e.g., "**/venv/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Descend into hidden directories (default: false)
    #[serde(default)]
    pub include_hidden: bool,
    /// Worker threads (default: one per core)
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            extensions: default_extensions(),
            excluded_paths: Vec::new(),
            include_hidden: false,
            jobs: None,
            output: OutputConfig::default(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

/// Where the report views are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory the view files are written into.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    #[serde(default = "default_snippets_file")]
    pub snippets_file: String,
    #[serde(default = "default_ast_file")]
    pub ast_file: String,
    /// Write all views into this single file instead.
    #[serde(default)]
    pub combined_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            summary_file: default_summary_file(),
            snippets_file: default_snippets_file(),
            ast_file: default_ast_file(),
            combined_file: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_summary_file() -> String {
    "function_summaries.txt".to_string()
}

fn default_snippets_file() -> String {
    "code_snippets.txt".to_string()
}

fn default_ast_file() -> String {
    "function_asts.txt".to_string()
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Whether a file extension (without dot) is analyzed.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.trim_start_matches('.') == ext)
    }

    /// Compile `excluded_paths` into a matcher.
    pub fn exclusion_set(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// Discover a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Load the given config file, a discovered one, or the defaults.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Config::parse_file(path)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e)),
        None => match discover() {
            Some(path) => {
                tracing::debug!("using config {}", path.display());
                Config::parse_file(&path)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))
            }
            None => Ok(Config::default()),
        },
    }
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.extensions.is_empty() {
        anyhow::bail!("extensions must list at least one file extension");
    }
    for ext in &config.extensions {
        if ext.trim_start_matches('.').is_empty() {
            anyhow::bail!("invalid extension {:?}", ext);
        }
    }

    if config.jobs == Some(0) {
        anyhow::bail!("jobs must be at least 1");
    }

    // Validate excluded_paths glob patterns compile
    config.exclusion_set()?;

    let output = &config.output;
    let names = [
        &output.summary_file,
        &output.snippets_file,
        &output.ast_file,
    ];
    if names.iter().any(|n| n.is_empty()) {
        anyhow::bail!("output file names must not be empty");
    }
    if output.summary_file == output.snippets_file
        || output.summary_file == output.ast_file
        || output.snippets_file == output.ast_file
    {
        anyhow::bail!("summary, snippets and ast output files must be distinct");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1"
extensions: ["py", ".pyi"]
excluded_paths:
  - "**/venv/**"
jobs: 4
output:
  directory: "out"
  combined_file: "all.txt"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.matches_extension("py"));
        assert!(config.matches_extension("pyi"));
        assert!(!config.matches_extension("rs"));
        assert_eq!(config.jobs, Some(4));
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.output.summary_file, "function_summaries.txt");
        assert_eq!(config.output.combined_file.as_deref(), Some("all.txt"));
        validate(&config).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.extensions, vec!["py"]);
        assert!(!config.include_hidden);
        assert_eq!(config.output.ast_file, "function_asts.txt");
        validate(&config).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.excluded_paths.push("[".to_string());
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.jobs = Some(0);
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.output.ast_file = config.output.summary_file.clone();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.extensions.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_exclusion_set_matches() {
        let config = Config {
            excluded_paths: vec!["**/build/**".to_string()],
            ..Default::default()
        };
        let set = config.exclusion_set().unwrap();
        assert!(set.is_match("pkg/build/gen.py"));
        assert!(!set.is_match("pkg/src/gen.py"));
    }
}
