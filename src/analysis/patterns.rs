//! Anti-pattern and performance-pattern tables.
//!
//! Each pattern contributes its message at most once per snippet, however
//! many times it matches.

use once_cell::sync::Lazy;
use regex::Regex;

/// Where a pattern's message lands in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    Issue,
    Suggestion,
}

/// A compiled pattern and the message it produces.
struct PatternRule {
    regex: Regex,
    kind: FindingKind,
    message: &'static str,
}

fn rule(pattern: &str, kind: FindingKind, message: &'static str) -> PatternRule {
    PatternRule {
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern:?}: {e}")),
        kind,
        message,
    }
}

static ANTI_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    use FindingKind::*;
    vec![
        rule(
            r"except:\s*pass",
            Issue,
            "Bare except clause with pass - handle specific exceptions",
        ),
        rule(
            r"except Exception as e:\s*pass",
            Issue,
            "General exception caught and ignored",
        ),
        rule(
            r"while True:.*break",
            Suggestion,
            "Consider replacing 'while True' with a more explicit condition",
        ),
        rule(
            r"global\s+\w+",
            Suggestion,
            "Global variables in use - consider refactoring for a better design",
        ),
        rule(
            r"print\s*\(",
            Suggestion,
            "print statements in use - consider logging for production code",
        ),
        rule(
            r"\[i\s+for\s+i\s+in",
            Suggestion,
            "Unclear list comprehension - consider more descriptive names",
        ),
        rule(
            r"\.sort\(.*lambda",
            Suggestion,
            "lambda in sort - consider operator.itemgetter or methodcaller",
        ),
    ]
});

static PERFORMANCE_PATTERNS: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    use FindingKind::*;
    vec![
        rule(
            r"\+\s*str\(",
            Suggestion,
            "Inefficient string concatenation - use join() or f-strings",
        ),
        rule(
            r"range\(len\(",
            Suggestion,
            "range(len()) in use - consider enumerate()",
        ),
        rule(
            r"\[.*\]\s*\*\s*\d+",
            Suggestion,
            "List multiplication can be inefficient for large lists",
        ),
        rule(
            r"dict\(\[\(.*\)\]\)",
            Suggestion,
            "Inefficient dict construction - use a dict comprehension",
        ),
    ]
});

/// Issues and suggestions found by a table scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatternFindings {
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

impl PatternFindings {
    fn scan(&mut self, code: &str, rules: &[PatternRule]) {
        for rule in rules.iter().filter(|r| r.regex.is_match(code)) {
            match rule.kind {
                FindingKind::Issue => self.issues.push(rule.message.to_string()),
                FindingKind::Suggestion => self.suggestions.push(rule.message.to_string()),
            }
        }
    }
}

/// Scan the anti-pattern table.
pub fn check_anti_patterns(code: &str) -> PatternFindings {
    let mut findings = PatternFindings::default();
    findings.scan(code, &ANTI_PATTERNS);
    findings
}

/// Scan the performance table.
pub fn check_performance(code: &str) -> PatternFindings {
    let mut findings = PatternFindings::default();
    findings.scan(code, &PERFORMANCE_PATTERNS);
    findings
}
