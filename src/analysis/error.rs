//! Per-file analysis errors.

use thiserror::Error;

use super::FailureKind;

/// Errors that abort the analysis of a single file.
///
/// None of these cross a file boundary: the pipeline turns each one into a
/// [`FileFailure`](super::FileFailure) and moves on.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}:{column}: {message}")]
    Parse {
        file: String,
        message: String,
        line: usize,
        column: usize,
    },
    #[error("{file}:{line}:{column}: malformed {kind} node: {detail}")]
    MalformedNode {
        file: String,
        kind: String,
        detail: String,
        line: usize,
        column: usize,
    },
    #[error("parser setup failed: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl AnalysisError {
    /// Build a malformed-node error positioned at `node`.
    pub fn malformed(file: &str, node: tree_sitter::Node, detail: impl Into<String>) -> Self {
        let pos = node.start_position();
        AnalysisError::MalformedNode {
            file: file.to_string(),
            kind: node.kind().to_string(),
            detail: detail.into(),
            line: pos.row + 1,
            column: pos.column + 1,
        }
    }

    /// Failure category reported in the skipped-file listing.
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Io { .. } => FailureKind::Io,
            AnalysisError::Parse { .. } => FailureKind::Parse,
            AnalysisError::MalformedNode { .. } | AnalysisError::Language(_) => {
                FailureKind::MalformedNode
            }
        }
    }
}
