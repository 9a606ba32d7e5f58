//! Human-readable summaries of an ndiff.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered change patterns; the first one matching a block wins.
static CHANGE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"def\s+(\w+)", "function"),
        (r"class\s+(\w+)", "class"),
        (r"import\s+(\w+)", "import"),
        (r"return\s+", "return statement"),
        (r"if\s+", "condition"),
        (r"for\s+", "loop"),
        (r"while\s+", "loop"),
        (r"try:", "error handling"),
    ]
    .into_iter()
    .map(|(pattern, label)| {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid change pattern {pattern:?}: {e}"));
        (regex, label)
    })
    .collect()
});

/// One summary per block of consecutive `+ ` / `- ` lines.
///
/// Context lines and `? ` guide lines close the current block.
pub fn summarize<S: AsRef<str>>(diff: &[S]) -> Vec<String> {
    let mut summary = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in diff.iter().map(AsRef::as_ref) {
        if line.starts_with("+ ") || line.starts_with("- ") {
            block.push(line);
        } else if !block.is_empty() {
            summary.push(summarize_block(&block));
            block.clear();
        }
    }
    if !block.is_empty() {
        summary.push(summarize_block(&block));
    }

    summary
}

fn summarize_block(block: &[&str]) -> String {
    let added: Vec<&str> = block.iter().filter_map(|l| l.strip_prefix("+ ")).collect();
    let removed: Vec<&str> = block.iter().filter_map(|l| l.strip_prefix("- ")).collect();

    for (regex, label) in CHANGE_PATTERNS.iter() {
        for (verb, lines) in [("Added", &added), ("Removed", &removed)] {
            if let Some(caps) = lines.iter().find_map(|l| regex.captures(l)) {
                return match caps.get(1) {
                    Some(name) => format!("{verb} {label} '{}'", name.as_str()),
                    None => format!("{verb} {label}"),
                };
            }
        }
    }

    match block.len() {
        1 => "Modified one line".to_string(),
        n => format!("Modified {n} lines"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_function() {
        let diff = ["  import os", "+ def load(path):", "+     return open(path)"];
        assert_eq!(summarize(&diff), vec!["Added function 'load'"]);
    }

    #[test]
    fn test_pattern_order_beats_line_order() {
        // the return line comes first but `def` is earlier in the table
        let diff = ["- return x", "- def old():"];
        assert_eq!(summarize(&diff), vec!["Removed function 'old'"]);
    }

    #[test]
    fn test_added_checked_before_removed() {
        let diff = ["- if a:", "+ if b:"];
        assert_eq!(summarize(&diff), vec!["Added condition"]);
    }

    #[test]
    fn test_guide_lines_split_blocks() {
        let diff = ["- x = 1", "?     ^", "+ x = 2", "?     ^"];
        assert_eq!(summarize(&diff), vec!["Modified one line", "Modified one line"]);
    }

    #[test]
    fn test_generic_fallback() {
        let diff = ["  a", "- x = 1", "- y = 2", "+ z = 3", "  b"];
        assert_eq!(summarize(&diff), vec!["Modified 3 lines"]);
    }

    #[test]
    fn test_empty_diff() {
        assert!(summarize::<&str>(&[]).is_empty());
    }
}
