//! Comparison of an analysis against the previous snapshot of the same file.

use std::collections::{BTreeSet, HashMap};

use super::{FunctionInfo, Snapshot, VersionChange};
use crate::diff::{ndiff, summarize, DiffCounts};

/// Cognitive-load deltas beyond this are reported as significant.
pub const SIGNIFICANT_COMPLEXITY_DELTA: i64 = 5;

/// What is known about the current version when comparing.
pub struct CurrentVersion<'a> {
    pub code: &'a str,
    pub cognitive_load: usize,
    pub functions: &'a [FunctionInfo],
    pub syntax_error: bool,
}

/// Diff counts, complexity delta, and function-level changes.
pub fn compare_versions(previous: &Snapshot, current: &CurrentVersion) -> VersionChange {
    let diff = ndiff(&previous.code, current.code);
    let counts = DiffCounts::from_diff(&diff);

    let mut change = VersionChange {
        lines_added: counts.added,
        lines_removed: counts.removed,
        lines_modified: counts.modified,
        complexity_delta: current.cognitive_load as i64
            - previous.result.complexity.cognitive_load as i64,
        ..Default::default()
    };

    if change.complexity_delta.abs() > SIGNIFICANT_COMPLEXITY_DELTA {
        change.significant_changes.push(format!(
            "Significant complexity change: {}",
            change.complexity_delta
        ));
    }

    if previous.syntax_error || current.syntax_error {
        change
            .significant_changes
            .push("Function comparison skipped: code contains syntax errors".to_string());
    } else {
        compare_functions(&previous.result.functions, current.functions, &mut change);
    }

    change.diff_summary = summarize(&diff);
    change
}

fn compare_functions(previous: &[FunctionInfo], current: &[FunctionInfo], change: &mut VersionChange) {
    let before = arities(previous);
    let after = arities(current);
    let after_lookup: HashMap<&str, usize> = after.iter().map(|(n, a)| (*n, *a)).collect();
    let before_names: BTreeSet<&str> = before.iter().map(|(n, _)| *n).collect();

    for (name, prev_args) in &before {
        match after_lookup.get(name) {
            None => change
                .breaking_changes
                .push(format!("Function removed: {name}")),
            Some(curr_args) if curr_args != prev_args => change.breaking_changes.push(format!(
                "Signature changed for {name}: from {prev_args} to {curr_args} arguments"
            )),
            Some(_) => {}
        }
    }

    for (name, _) in &after {
        if !before_names.contains(name) {
            change.significant_changes.push(format!("New function: {name}"));
        }
    }
}

/// Function names with their positional argument counts, in source order.
///
/// A name defined more than once keeps its last definition's count, at the
/// position of its first.
fn arities(functions: &[FunctionInfo]) -> Vec<(&str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for f in functions {
        if counts.insert(&f.name, f.args).is_none() {
            order.push(&f.name);
        }
    }
    order.into_iter().map(|n| (n, counts[n])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;

    fn function(name: &str, args: usize) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            args,
            ..Default::default()
        }
    }

    fn snapshot(code: &str, load: usize, functions: Vec<FunctionInfo>) -> Snapshot {
        let mut result = AnalysisResult::default();
        result.complexity.cognitive_load = load;
        result.functions = functions;
        Snapshot {
            code: code.to_string(),
            result,
            syntax_error: false,
        }
    }

    #[test]
    fn test_identical_versions() {
        let code = "def f(a):\n    return a\n";
        let functions = vec![function("f", 1)];
        let previous = snapshot(code, 1, functions.clone());
        let change = compare_versions(
            &previous,
            &CurrentVersion {
                code,
                cognitive_load: 1,
                functions: &functions,
                syntax_error: false,
            },
        );
        assert_eq!(change.lines_added, 0);
        assert_eq!(change.lines_removed, 0);
        assert_eq!(change.complexity_delta, 0);
        assert!(change.breaking_changes.is_empty());
        assert!(change.diff_summary.is_empty());
    }

    #[test]
    fn test_breaking_and_new_functions() {
        let previous = snapshot(
            "def a(x):\n    pass\ndef b(x):\n    pass\n",
            2,
            vec![function("a", 1), function("b", 1)],
        );
        let functions = vec![function("a", 2), function("c", 0)];
        let change = compare_versions(
            &previous,
            &CurrentVersion {
                code: "def a(x, y):\n    pass\ndef c():\n    pass\n",
                cognitive_load: 2,
                functions: &functions,
                syntax_error: false,
            },
        );
        assert_eq!(
            change.breaking_changes,
            vec![
                "Signature changed for a: from 1 to 2 arguments",
                "Function removed: b",
            ]
        );
        assert_eq!(change.significant_changes, vec!["New function: c"]);
    }

    #[test]
    fn test_significant_complexity_delta() {
        let previous = snapshot("x = 1\n", 0, Vec::new());
        let change = compare_versions(
            &previous,
            &CurrentVersion {
                code: "x = 1\n",
                cognitive_load: 7,
                functions: &[],
                syntax_error: false,
            },
        );
        assert_eq!(change.complexity_delta, 7);
        assert_eq!(change.significant_changes, vec!["Significant complexity change: 7"]);
    }

    #[test]
    fn test_syntax_error_skips_function_comparison() {
        let previous = snapshot("def a():\n    pass\n", 1, vec![function("a", 0)]);
        let change = compare_versions(
            &previous,
            &CurrentVersion {
                code: "def a(:\n",
                cognitive_load: 0,
                functions: &[],
                syntax_error: true,
            },
        );
        assert!(change.breaking_changes.is_empty());
        assert!(change.significant_changes[0].contains("syntax errors"));
    }
}
