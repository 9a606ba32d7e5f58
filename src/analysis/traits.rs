//! Core traits for syntax-tree analysis.

use super::{ClassInfo, Complexity, FunctionInfo};

/// Holds a parsed tree-sitter tree and the source it came from.
///
/// Kept separate from the extracted structure so the complexity walk and the
/// structure walk share one parse.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Definitions and imports extracted from one parsed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    /// Functions in source order, methods and nested functions included.
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    /// Fully-qualified import strings in source order.
    pub imports: Vec<String>,
}

/// Language-specific syntax analyzer.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser per
/// call.
pub trait SyntaxAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source into a tree-sitter tree.
    ///
    /// Returns an error only if the parser cannot run at all. Syntax errors
    /// still produce a tree with ERROR nodes.
    fn parse(&self, source: &str) -> anyhow::Result<ParsedFile>;

    /// Complexity of the whole file.
    fn complexity(&self, parsed: &ParsedFile) -> Complexity;

    /// Functions, classes and imports.
    fn extract_structure(&self, parsed: &ParsedFile) -> anyhow::Result<Structure>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
