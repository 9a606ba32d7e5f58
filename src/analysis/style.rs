//! Line-level style checks.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// PEP 8 line limit.
pub const MAX_LINE_LENGTH: usize = 79;

static DEFINITION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:def|class)\s+(\w+)").expect("definition name regex"));
static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("snake case regex"));
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("camel case regex"));

/// Operators checked for surrounding whitespace; each may take a trailing `=`.
const SPACED_OPERATORS: &[char] = &['+', '-', '*', '/', '<', '>'];

const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '<', '>', '=', '!', '%', '&', '|', '^'];

/// Keywords after which `-x` or `*x` is a prefix operator.
const UNARY_KEYWORDS: &[&str] = &[
    "return", "yield", "in", "and", "or", "not", "if", "elif", "else", "lambda", "print",
];

/// Run every style check and return the issues in check order.
pub fn check_style(code: &str) -> Vec<String> {
    let lines: Vec<&str> = code.lines().collect();
    let mut issues = Vec::new();

    if let Some(issue) = check_indentation(&lines) {
        issues.push(issue);
    }
    issues.extend(check_line_length(&lines));
    if let Some(issue) = check_naming(code) {
        issues.push(issue);
    }
    issues.extend(check_operator_spacing(&lines));

    issues
}

/// More than one distinct positive indentation width.
fn check_indentation(lines: &[&str]) -> Option<String> {
    let widths: BTreeSet<usize> = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .filter(|w| *w > 0)
        .collect();

    (widths.len() > 1).then(|| {
        let listed: Vec<String> = widths.iter().map(|w| w.to_string()).collect();
        format!("Inconsistent indentation: found widths {}", listed.join(", "))
    })
}

fn check_line_length(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let len = line.chars().count();
            (len > MAX_LINE_LENGTH).then(|| format!("Line {} too long ({} characters)", i + 1, len))
        })
        .collect()
}

/// Both snake_case and CamelCase definition names present.
fn check_naming(code: &str) -> Option<String> {
    let names: Vec<&str> = DEFINITION_NAME
        .captures_iter(code)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let snake = names.iter().any(|n| SNAKE_CASE.is_match(n));
    let camel = names.iter().any(|n| CAMEL_CASE.is_match(n));

    (snake && camel).then(|| "Mixed naming conventions (snake_case and CamelCase)".to_string())
}

/// One issue per operator without whitespace on both sides.
///
/// Every character is examined in turn, so chained assignments report each
/// `=`. `=` inside parentheses (keyword arguments, defaults), comparisons
/// (`==`, `!=`), unary and splat operators, and operators glued to another
/// operator (`->`, `**`, `//`) are not reported.
fn check_operator_spacing(lines: &[&str]) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let chars: Vec<(usize, char)> = line.char_indices().collect();
        let at = |k: usize| chars.get(k).map(|&(_, c)| c);
        let mut k = 0;

        while k < chars.len() {
            let (start, c) = chars[k];
            let before = k.checked_sub(1).and_then(at);

            let (width, op, spaced) = if c == '=' {
                let after = at(k + 1);
                if matches!(before, Some('=' | '!' | '<' | '>')) || after == Some('=') {
                    k += 1 + usize::from(after == Some('='));
                    continue;
                }
                if paren_depth(&line[..start]) > 0 {
                    k += 1;
                    continue;
                }
                (1, "=", around_whitespace(before, after))
            } else if SPACED_OPERATORS.contains(&c) {
                let width = 1 + usize::from(at(k + 1) == Some('='));
                let after = at(k + width);
                let prefix = &line[..start];
                if is_unary_position(prefix) || glued(before) || glued(after) {
                    k += width;
                    continue;
                }
                let end = chars.get(k + width).map_or(line.len(), |&(b, _)| b);
                (width, &line[start..end], around_whitespace(before, after))
            } else {
                k += 1;
                continue;
            };

            if !spaced {
                issues.push(format!(
                    "Line {}: missing whitespace around operator '{}'",
                    i + 1,
                    op
                ));
            }
            k += width;
        }
    }

    issues
}

fn around_whitespace(before: Option<char>, after: Option<char>) -> bool {
    before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
}

fn glued(c: Option<char>) -> bool {
    c.is_some_and(|c| OPERATOR_CHARS.contains(&c))
}

/// Whether an operator after `prefix` is a prefix operator (`-1`, `*args`).
fn is_unary_position(prefix: &str) -> bool {
    let prefix = prefix.trim_end();
    match prefix.chars().next_back() {
        None => true,
        Some(c) if matches!(c, '(' | '[' | '{' | ',' | ':') || OPERATOR_CHARS.contains(&c) => true,
        Some(_) => {
            let word = prefix
                .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or("");
            UNARY_KEYWORDS.contains(&word)
        }
    }
}

fn paren_depth(prefix: &str) -> i32 {
    prefix.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code_has_no_issues() {
        let code = "def add(a, b=1):\n    total = a + b\n    return total\n";
        assert!(check_style(code).is_empty());
    }

    #[test]
    fn test_inconsistent_indentation() {
        let code = "if x:\n  y = 1\nif z:\n    w = 2\n";
        let issues = check_style(code);
        assert_eq!(issues, vec!["Inconsistent indentation: found widths 2, 4"]);
    }

    #[test]
    fn test_long_lines_one_issue_each() {
        let long = "x = 1  # ".to_string() + &"a".repeat(80);
        let code = format!("{long}\n{long}\n");
        let issues = check_style(&code);
        assert_eq!(issues.iter().filter(|i| i.contains("too long")).count(), 2);
        assert!(issues[0].starts_with("Line 1 too long"));
    }

    #[test]
    fn test_mixed_naming() {
        let issues = check_style("class UserRepo:\n    pass\ndef load_user():\n    pass\n");
        assert!(issues.iter().any(|i| i.contains("Mixed naming")));
    }

    #[test]
    fn test_missing_operator_spacing() {
        let issues = check_style("x=1\ny = a+b\nz = -1\nf(key=2)\nif n < -2:\n    pass\n");
        assert_eq!(
            issues,
            vec![
                "Line 1: missing whitespace around operator '='",
                "Line 2: missing whitespace around operator '+'",
            ]
        );
    }

    #[test]
    fn test_chained_assignment_reports_each_operator() {
        let issues = check_style("x=y=z\n");
        assert_eq!(
            issues,
            vec![
                "Line 1: missing whitespace around operator '='",
                "Line 1: missing whitespace around operator '='",
            ]
        );
    }

    #[test]
    fn test_augmented_and_comparison_operators() {
        let issues = check_style("x += 1\nok = a == b\nx-=1\n");
        assert_eq!(issues, vec!["Line 3: missing whitespace around operator '-='"]);
    }

    #[test]
    fn test_arrow_and_splat_not_reported() {
        let issues = check_style("def f(*args, **kwargs) -> dict:\n    return {}\n");
        assert!(issues.is_empty(), "{issues:?}");
    }
}
