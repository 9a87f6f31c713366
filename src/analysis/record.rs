//! Record structures produced by function extraction.

use std::fmt;

use serde::Serialize;

use super::AnalysisError;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Summary of a single function definition.
///
/// Everything is copied out of the tree and source buffer at extraction
/// time, so a record outlives the parse that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    /// The function name.
    pub name: String,
    /// Dotted path through enclosing classes and functions (e.g. `Config.load`).
    pub qualified_name: String,
    /// Parameter identifiers in declaration order.
    pub parameters: Vec<String>,
    /// Value of the leading string literal, if the body starts with one.
    pub docstring: Option<String>,
    /// Verbatim source text of the definition.
    pub source_text: Option<String>,
    /// Serialized subtree of the definition.
    pub tree_dump: String,
    /// Whether this is an `async def`.
    pub is_async: bool,
    /// Decorator expressions without the leading `@`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    /// Source span of the `def` (decorators excluded).
    pub span: Span,
}

impl FunctionRecord {
    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Docstring, treating an empty literal as absent.
    pub fn docstring_text(&self) -> Option<&str> {
        self.docstring.as_deref().filter(|d| !d.is_empty())
    }
}

/// Functions extracted from one file, in visit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File identifier (path relative to the analysis root).
    pub file: String,
    /// Records in pre-order traversal order.
    pub functions: Vec<FunctionRecord>,
}

impl FileReport {
    pub fn new(file: impl Into<String>, functions: Vec<FunctionRecord>) -> Self {
        Self {
            file: file.into(),
            functions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Category of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    Parse,
    MalformedNode,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Io => "io error",
            FailureKind::Parse => "parse error",
            FailureKind::MalformedNode => "malformed node",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    pub fn from_error(file: impl Into<String>, err: &AnalysisError) -> Self {
        Self {
            file: file.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Reports for every analyzed file, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Successfully processed files. Files without functions are kept with
    /// an empty report.
    pub files: Vec<FileReport>,
    /// Files that were skipped.
    pub failures: Vec<FileFailure>,
    /// Number of files handed to the extractor.
    pub scanned: usize,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file's report. Records are stored as given.
    pub fn aggregate(&mut self, report: FileReport) {
        self.scanned += 1;
        self.files.push(report);
    }

    /// Record a skipped file.
    pub fn record_failure(&mut self, failure: FileFailure) {
        self.scanned += 1;
        self.failures.push(failure);
    }

    /// Look up a file's report by identifier.
    pub fn get(&self, file: &str) -> Option<&FileReport> {
        self.files.iter().find(|r| r.file == file)
    }

    /// Total number of extracted functions.
    pub fn function_count(&self) -> usize {
        self.files.iter().map(|r| r.functions.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, docstring: Option<&str>) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            qualified_name: name.to_string(),
            parameters: vec!["a".to_string()],
            docstring: docstring.map(str::to_string),
            source_text: None,
            tree_dump: String::new(),
            is_async: false,
            decorators: vec![],
            span: Span {
                start_byte: 0,
                end_byte: 0,
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        }
    }

    #[test]
    fn test_aggregate_preserves_order() {
        let mut result = AnalysisResult::new();
        result.aggregate(FileReport::new("b.py", vec![record("f", None)]));
        result.aggregate(FileReport::new("a.py", vec![]));
        result.record_failure(FileFailure {
            file: "broken.py".to_string(),
            kind: FailureKind::Parse,
            message: "bad".to_string(),
        });

        let names: Vec<_> = result.files.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(names, vec!["b.py", "a.py"]);
        assert_eq!(result.scanned, 3);
        assert_eq!(result.function_count(), 1);
        assert!(result.get("a.py").unwrap().is_empty());
        assert!(result.get("broken.py").is_none());
        assert!(result.has_failures());
    }

    #[test]
    fn test_empty_docstring_is_absent_text() {
        assert_eq!(record("f", Some("")).docstring_text(), None);
        assert_eq!(record("f", Some("doc")).docstring_text(), Some("doc"));
        assert_eq!(record("f", None).docstring_text(), None);
    }
}
