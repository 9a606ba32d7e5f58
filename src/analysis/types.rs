//! Result structures produced by the code analyzer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Line-based statistics of a snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeStats {
    pub total_lines: usize,
    pub empty_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub docstring_lines: usize,
    /// Mean length of non-blank lines, in characters.
    pub avg_line_length: f64,
    pub max_line_length: usize,
    pub imports_count: usize,
    pub classes_count: usize,
    pub functions_count: usize,
}

/// Complexity metrics from the syntax-tree walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub cognitive_load: usize,
    /// Deepest nesting of if/loop/try reached.
    pub nesting_depth: usize,
    pub branches: usize,
    /// Highest `total_complexity` among the functions.
    pub max_method_complexity: usize,
    /// `cognitive_load + 2 * nesting_depth + branches`
    pub total_complexity: usize,
}

impl Complexity {
    pub(crate) fn finish(mut self) -> Self {
        self.total_complexity = self.cognitive_load + 2 * self.nesting_depth + self.branches;
        self
    }
}

/// A function or method definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Positional-or-keyword parameters, `self` included. Parameters before
    /// a `/` are counted in `posonly_args` instead.
    pub args: usize,
    pub posonly_args: usize,
    pub kwonly_args: usize,
    /// Positional parameters with a default value, positional-only included.
    pub defaults: usize,
    pub has_varargs: bool,
    pub has_kwargs: bool,
    pub has_docstring: bool,
    pub decorators: Vec<String>,
    /// Return annotation as written, if any.
    pub returns: Option<String>,
    pub is_async: bool,
    pub complexity: Complexity,
    pub calls: BTreeSet<String>,
    pub attributes: BTreeSet<String>,
    /// 1-based line of the `def`.
    pub line: usize,
}

/// A class definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub bases: Vec<String>,
    pub has_docstring: bool,
    pub decorators: Vec<String>,
    /// Names of functions defined directly in the class body.
    pub methods: Vec<String>,
    pub attributes: BTreeSet<String>,
    pub line: usize,
}

/// Differences against the previous snapshot of the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Count of `?` guide lines in the diff.
    pub lines_modified: usize,
    /// Cognitive-load delta, current minus previous.
    pub complexity_delta: i64,
    pub significant_changes: Vec<String>,
    pub breaking_changes: Vec<String>,
    pub diff_summary: Vec<String>,
}

/// Everything `analyze` reports about one snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub stats: CodeStats,
    pub complexity: Complexity,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<String>,
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_changes: Option<VersionChange>,
}

impl AnalysisResult {
    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Whether the analysis reported any issue.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
