//! The code analyzer: one pass of every analysis step over a snippet.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::{
    check_anti_patterns, check_performance, check_security, check_style, code_stats,
    compare_versions, dependencies, get_analyzer, AnalysisResult, Complexity, CurrentVersion,
    SecurityProfile, Snapshot, SnapshotStore, Structure, DEFAULT_SNAPSHOT_CAPACITY,
};
use crate::rules::ActiveRules;
use crate::settings::Settings;

/// Issue reported when the syntax tree contains errors.
pub const SYNTAX_ERROR_ISSUE: &str = "Code contains syntax errors";

/// Functions with more positional arguments than this get a suggestion.
pub const MAX_ARGUMENTS: usize = 5;

/// Extension assumed for snippets without a file identity.
const DEFAULT_EXTENSION: &str = "py";

/// Which optional check groups run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Style and anti-pattern checks.
    pub quality_checks: bool,
    pub security_checks: bool,
    pub performance_checks: bool,
    pub snapshot_capacity: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            quality_checks: true,
            security_checks: true,
            performance_checks: true,
            snapshot_capacity: DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}

impl AnalysisOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            quality_checks: settings.analysis.code_quality_checks,
            security_checks: settings.analysis.security_checks,
            performance_checks: settings.analysis.performance_checks,
            snapshot_capacity: settings.snapshot_capacity(),
        }
    }
}

/// Analyzes code snippets and remembers the last snapshot per file.
///
/// The snapshot store sits behind a mutex, so one analyzer can be shared
/// across threads.
pub struct CodeAnalyzer {
    options: AnalysisOptions,
    snapshots: Mutex<SnapshotStore>,
}

/// Outcome of the syntax-tree steps.
#[derive(Default)]
struct TreeAnalysis {
    complexity: Complexity,
    structure: Structure,
    syntax_error: bool,
    issues: Vec<String>,
}

impl CodeAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            snapshots: Mutex::new(SnapshotStore::new(options.snapshot_capacity)),
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze `code`, optionally identified by a file name.
    ///
    /// With an identity, the result is compared against the previous snapshot
    /// for that identity and replaces it. The extension of the identity picks
    /// the syntax analyzer and the security table; without one the code is
    /// treated as Python.
    pub fn analyze(&self, code: &str, identity: Option<&str>, rules: &ActiveRules) -> AnalysisResult {
        let ext = identity
            .and_then(|id| Path::new(id).extension())
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| {
                if identity.is_some() {
                    String::new()
                } else {
                    DEFAULT_EXTENSION.to_string()
                }
            });
        debug!(identity = ?identity, ext = %ext, "analyzing code");

        let tree = analyze_tree(code, &ext);
        let mut result = AnalysisResult {
            stats: code_stats(code),
            complexity: tree.complexity,
            issues: tree.issues,
            ..Default::default()
        };

        result.dependencies = dependencies(&tree.structure.imports);
        result.imports = tree.structure.imports;
        result.functions = tree.structure.functions;
        result.classes = tree.structure.classes;
        structure_findings(&mut result, rules);

        if self.options.quality_checks {
            result.issues.extend(check_style(code));
            let patterns = check_anti_patterns(code);
            result.issues.extend(patterns.issues);
            result.suggestions.extend(patterns.suggestions);
        }
        if self.options.performance_checks {
            let performance = check_performance(code);
            result.issues.extend(performance.issues);
            result.suggestions.extend(performance.suggestions);
        }
        if self.options.security_checks {
            let profile = SecurityProfile::for_extension(&ext);
            result.issues.extend(check_security(code, profile));
        }

        if let Some(identity) = identity {
            // diff outside the lock; only the lookup and insert hold it
            let previous = self.lock_snapshots().get(identity).cloned();

            if let Some(previous) = previous {
                let current = CurrentVersion {
                    code,
                    cognitive_load: result.complexity.cognitive_load,
                    functions: &result.functions,
                    syntax_error: tree.syntax_error,
                };
                result.version_changes = Some(compare_versions(&previous, &current));
            }

            let snapshot = Snapshot {
                code: code.to_string(),
                result: result.clone(),
                syntax_error: tree.syntax_error,
            };
            if let Some(evicted) = self.lock_snapshots().insert(identity, snapshot) {
                debug!(evicted = %evicted, "snapshot evicted");
            }
        }

        result
    }

    /// Drop every stored snapshot.
    pub fn clear_snapshots(&self) {
        self.lock_snapshots().clear();
    }

    /// Number of identities with a stored snapshot.
    pub fn snapshot_count(&self) -> usize {
        self.lock_snapshots().len()
    }

    fn lock_snapshots(&self) -> MutexGuard<'_, SnapshotStore> {
        // a panic while holding the lock cannot leave the store half-updated
        self.snapshots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

/// Complexity and structure for extensions with a syntax analyzer.
fn analyze_tree(code: &str, ext: &str) -> TreeAnalysis {
    let Some(analyzer) = get_analyzer(ext) else {
        debug!(ext = %ext, "no syntax analyzer, skipping structure");
        return TreeAnalysis::default();
    };

    let parsed = match analyzer.parse(code) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "parser failed to run");
            return TreeAnalysis {
                syntax_error: true,
                issues: vec![format!("Syntax analysis failed: {e}")],
                ..Default::default()
            };
        }
    };

    if parsed.has_errors() {
        debug!("syntax tree contains errors");
        return TreeAnalysis {
            syntax_error: true,
            issues: vec![SYNTAX_ERROR_ISSUE.to_string()],
            ..Default::default()
        };
    }

    let mut complexity = analyzer.complexity(&parsed);
    match analyzer.extract_structure(&parsed) {
        Ok(structure) => {
            complexity.max_method_complexity = structure
                .functions
                .iter()
                .map(|f| f.complexity.total_complexity)
                .max()
                .unwrap_or(0);
            TreeAnalysis {
                complexity,
                structure,
                ..Default::default()
            }
        }
        Err(e) => {
            warn!(error = %e, "structure extraction failed");
            TreeAnalysis {
                complexity,
                issues: vec![format!("Structure analysis failed: {e}")],
                ..Default::default()
            }
        }
    }
}

/// Docstring and argument-count findings gated by the active rules.
fn structure_findings(result: &mut AnalysisResult, rules: &ActiveRules) {
    if rules.contains("maintain_style") {
        let missing_functions = result
            .functions
            .iter()
            .filter(|f| !f.has_docstring)
            .map(|f| format!("Function {} missing docstring", f.name));
        let missing_classes = result
            .classes
            .iter()
            .filter(|c| !c.has_docstring)
            .map(|c| format!("Class {} missing docstring", c.name));
        let missing: Vec<String> = missing_functions.chain(missing_classes).collect();
        result.issues.extend(missing);
    }

    if rules.contains("practical_improvements") {
        let crowded: Vec<String> = result
            .functions
            .iter()
            .filter(|f| f.args > MAX_ARGUMENTS)
            .map(|f| format!("Consider reducing number of arguments in {}", f.name))
            .collect();
        result.suggestions.extend(crowded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(ids: &[&str]) -> ActiveRules {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_docstring_findings_follow_rules() {
        let analyzer = CodeAnalyzer::default();
        let code = "def f():\n    return 1\n";

        let with = analyzer.analyze(code, None, &rules(&["maintain_style"]));
        assert!(with.issues.contains(&"Function f missing docstring".to_string()));

        let without = analyzer.analyze(code, None, &ActiveRules::new());
        assert!(!without.issues.iter().any(|i| i.contains("docstring")));
    }

    #[test]
    fn test_many_arguments_suggestion() {
        let analyzer = CodeAnalyzer::default();
        let code = "def wide(a, b, c, d, e, f):\n    return a\n";
        let result = analyzer.analyze(code, None, &rules(&["practical_improvements"]));
        assert!(result
            .suggestions
            .contains(&"Consider reducing number of arguments in wide".to_string()));
    }

    #[test]
    fn test_positional_only_arguments_not_counted_as_crowded() {
        let analyzer = CodeAnalyzer::default();
        let code = "def narrow(a, b, c, d, e, f, /):\n    return a\n";
        let result = analyzer.analyze(code, None, &rules(&["practical_improvements"]));
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
    }

    #[test]
    fn test_syntax_error_zeroes_complexity() {
        let analyzer = CodeAnalyzer::default();
        let result = analyzer.analyze("def broken(:\n    if x\n", None, &ActiveRules::new());
        assert_eq!(result.complexity, Complexity::default());
        assert!(result.functions.is_empty());
        assert!(result.issues.contains(&SYNTAX_ERROR_ISSUE.to_string()));
        assert_eq!(result.stats.total_lines, 3);
    }

    #[test]
    fn test_max_method_complexity() {
        let analyzer = CodeAnalyzer::default();
        let code = "def a():\n    return 1\n\ndef b(xs):\n    for x in xs:\n        if x:\n            return x\n";
        let result = analyzer.analyze(code, None, &ActiveRules::new());
        // b: def 1 + for 2 + if 1, depth 2, branches 2
        assert_eq!(result.complexity.max_method_complexity, 4 + 2 * 2 + 2);
    }

    #[test]
    fn test_unsupported_extension_skips_structure() {
        let analyzer = CodeAnalyzer::default();
        let code = "function f() { el.innerHTML = x; }\n";
        let result = analyzer.analyze(code, Some("app.js"), &ActiveRules::new());
        assert!(result.functions.is_empty());
        assert_eq!(result.complexity, Complexity::default());
        assert!(result.issues.iter().any(|i| i.contains("innerHTML")));
    }

    #[test]
    fn test_version_changes_with_identity() {
        let analyzer = CodeAnalyzer::default();
        let rules = ActiveRules::new();

        let first = analyzer.analyze("def a(x):\n    return x\n", Some("m.py"), &rules);
        assert!(first.version_changes.is_none());

        let second = analyzer.analyze("def a(x, y):\n    return x\n", Some("m.py"), &rules);
        let change = second.version_changes.expect("second analysis has changes");
        assert_eq!(
            change.breaking_changes,
            vec!["Signature changed for a: from 1 to 2 arguments"]
        );
        assert_eq!(analyzer.snapshot_count(), 1);
    }

    #[test]
    fn test_disabled_checks() {
        let analyzer = CodeAnalyzer::new(AnalysisOptions {
            quality_checks: false,
            security_checks: false,
            performance_checks: false,
            ..Default::default()
        });
        let code = "x=eval(input())\nfor i in range(len(xs)):\n    print(i)\n";
        let result = analyzer.analyze(code, None, &ActiveRules::new());
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_concurrent_identities_compare_against_own_snapshot() {
        let analyzer = CodeAnalyzer::default();
        let rules = ActiveRules::new();

        std::thread::scope(|scope| {
            for n in 0..8 {
                let (analyzer, rules) = (&analyzer, &rules);
                scope.spawn(move || {
                    let identity = format!("m{n}.py");
                    let before = "def a(x):\n    return x\n\n".repeat(50);
                    let after = format!("{before}def b{n}():\n    pass\n");
                    analyzer.analyze(&before, Some(&identity), rules);
                    let change = analyzer
                        .analyze(&after, Some(&identity), rules)
                        .version_changes
                        .expect("second analysis is compared");
                    assert_eq!(change.significant_changes, vec![format!("New function: b{n}")]);
                    assert_eq!(change.lines_added, 2);
                });
            }
        });
        assert_eq!(analyzer.snapshot_count(), 8);
    }

    #[test]
    fn test_analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodeAnalyzer>();
    }
}
