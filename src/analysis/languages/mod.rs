//! Language-specific analyzer implementations.

mod python;

pub use python::PythonAnalyzer;

use super::SyntaxAnalyzer;
use once_cell::sync::OnceCell;

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Get an analyzer for the given file extension (lowercase, without dot).
///
/// Returns None if no analyzer handles the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn SyntaxAnalyzer> {
    let python = PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
    python
        .handles_extension(ext)
        .then_some(python as &'static dyn SyntaxAnalyzer)
}

/// Get all file extensions with a syntax analyzer.
pub fn registered_extensions() -> Vec<&'static str> {
    PYTHON_ANALYZER
        .get_or_init(PythonAnalyzer::new)
        .file_extensions()
        .to_vec()
}
