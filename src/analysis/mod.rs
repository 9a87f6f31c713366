//! AST-backed function extraction.
//!
//! This module turns Python source files into [`FunctionRecord`]s using
//! tree-sitter. For every function definition (nested ones included) it
//! records the name, parameters, docstring, verbatim source text and a
//! serialized subtree.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ Source Files    │────▶│ Analyzer     │────▶│ FileReport     │
//! └─────────────────┘     │ (parse,      │     │ (FunctionRecord│
//!                         │  extract)    │     │  per def)      │
//!                         └──────────────┘     └────────────────┘
//!                                                      │ channel
//!                                                      ▼
//!                                              ┌────────────────┐
//!                                              │ AnalysisResult │
//!                                              │ (discovery     │
//!                                              │  order)        │
//!                                              └────────────────┘
//! ```

mod context;
pub mod docstring;
pub mod dump;
mod error;
mod languages;
mod record;
mod traits;

pub use context::AnalysisContext;
pub use dump::{dump_node, DUMP_FORMAT_VERSION};
pub use error::AnalysisError;
pub use languages::{
    get_analyzer, get_analyzer_by_id, register_analyzers, registered_extensions, PythonAnalyzer,
};
pub use record::{
    AnalysisResult, FailureKind, FileFailure, FileReport, FunctionRecord, Span,
};
pub use traits::{LanguageAnalyzer, ParsedFile};
