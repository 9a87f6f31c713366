//! pysummary - function summaries for Python source trees.
//!
//! pysummary walks a directory, parses every Python file with tree-sitter
//! and records each function definition (nested ones included): its name,
//! parameters, docstring, verbatim source text and a serialized syntax
//! tree. Results are written as three text views, a combined view, or JSON.
//!
//! # Architecture
//!
//! - `analysis`: parsing, function extraction and parallel aggregation
//! - `config`: YAML configuration schema
//! - `discover`: deterministic source file discovery
//! - `report`: output formatting (text views, JSON)
//! - `search`: line-oriented regex search
//! - `cli`: command-line subcommands

pub mod analysis;
pub mod cli;
pub mod config;
pub mod discover;
pub mod report;
pub mod search;

pub use analysis::{
    register_analyzers, AnalysisContext, AnalysisError, AnalysisResult, FileFailure, FileReport,
    FunctionRecord, LanguageAnalyzer, PythonAnalyzer,
};
pub use config::Config;

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
