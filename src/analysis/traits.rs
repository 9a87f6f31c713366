//! Core traits for language analysis.

use super::{AnalysisError, FunctionRecord};

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from the extracted records so the tree and the source
/// buffer can be dropped as soon as extraction is done.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// Full source text; node text is sliced from it.
    pub source: String,
    /// The file identifier (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get the source code as raw bytes.
    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    /// Exact source slice covered by a node, if its byte range is valid.
    pub fn node_slice(&self, node: tree_sitter::Node) -> Option<&str> {
        self.source.get(node.start_byte()..node.end_byte())
    }
}

/// Language-specific analyzer trait.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations create a
/// parser per call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source text into a tree.
    ///
    /// A tree containing syntax errors is rejected with
    /// [`AnalysisError::Parse`] positioned at the first error.
    fn parse(&self, path: &str, source: String) -> Result<ParsedFile, AnalysisError>;

    /// Extract one record per function definition, in pre-order.
    fn extract_functions(&self, parsed: &ParsedFile) -> Result<Vec<FunctionRecord>, AnalysisError>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
