//! Heuristic language guessing for unlabeled code snippets.
//!
//! Each language carries a table of `(indicator, weight)` pairs. A language's
//! score is the sum of `occurrences × weight` over its indicators, counted as
//! case-insensitive substrings. Matching is not token aware, so `from ` in a
//! SQL query also scores for Python.

use serde::{Deserialize, Serialize};

/// Language tag produced by [`guess_language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Python,
    JavaScript,
    Html,
    Css,
    Sql,
    Text,
}

impl LanguageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::JavaScript => "javascript",
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
            LanguageTag::Sql => "sql",
            LanguageTag::Text => "text",
        }
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bonus added to Python when a snippet with braces still looks Pythonic
/// (dict and set literals).
const PYTHON_BRACE_BONUS: usize = 2;

/// Minimum number of distinct Python indicators needed for the brace bonus.
const PYTHON_BRACE_MIN_INDICATORS: usize = 3;

const PYTHON_INDICATORS: &[(&str, usize)] = &[
    ("def ", 3),
    ("class ", 3),
    ("import ", 2),
    ("from ", 2),
    ("@", 1),
    ("if __name__", 3),
    (".py", 2),
    ("print(", 1),
    ("return ", 1),
    ("#", 1),
    ("self.", 2),
    ("elif ", 2),
    ("none", 1),
    ("true", 1),
    ("false", 1),
    ("try:", 2),
    ("except:", 2),
    ("with ", 2),
];

const JAVASCRIPT_INDICATORS: &[(&str, usize)] = &[
    ("function ", 3),
    ("const ", 2),
    ("let ", 2),
    ("var ", 2),
    ("=>", 3),
    ("document.", 3),
    ("window.", 3),
    (".js", 2),
    ("console.log(", 2),
    ("===", 2),
    ("!==", 2),
    ("undefined", 2),
];

const HTML_INDICATORS: &[(&str, usize)] = &[
    ("<html", 3),
    ("<body", 2),
    ("<div", 2),
    ("<p>", 1),
    ("<script", 2),
    ("<head", 2),
    ("<style", 2),
    ("<link", 1),
    ("<meta", 1),
    ("</div>", 2),
];

const CSS_INDICATORS: &[(&str, usize)] = &[
    ("{", 1),
    ("margin:", 2),
    ("padding:", 2),
    ("color:", 2),
    ("background:", 2),
    ("font-", 2),
    ("border:", 2),
    ("@media", 3),
    ("#", 1),
    (".class", 1),
    ("px;", 2),
    ("em;", 2),
    ("rem;", 2),
];

const SQL_INDICATORS: &[(&str, usize)] = &[
    ("select ", 3),
    ("from ", 2),
    ("where ", 2),
    ("insert into", 3),
    ("update ", 2),
    ("delete from", 3),
    ("create table", 3),
    ("join ", 2),
    ("group by", 2),
    ("order by", 2),
];

/// Indicator tables in tie-break priority order.
const LANGUAGES: &[(LanguageTag, &[(&str, usize)])] = &[
    (LanguageTag::Python, PYTHON_INDICATORS),
    (LanguageTag::JavaScript, JAVASCRIPT_INDICATORS),
    (LanguageTag::Html, HTML_INDICATORS),
    (LanguageTag::Css, CSS_INDICATORS),
    (LanguageTag::Sql, SQL_INDICATORS),
];

/// Per-language scores for a snippet, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageScores {
    pub scores: Vec<(LanguageTag, usize)>,
}

impl LanguageScores {
    pub fn get(&self, tag: LanguageTag) -> usize {
        self.scores
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.scores.iter().map(|(_, s)| *s).max().unwrap_or(0)
    }
}

/// Score a snippet against every indicator table.
pub fn score_languages(snippet: &str) -> LanguageScores {
    let code = snippet.trim().to_lowercase();

    let mut scores: Vec<(LanguageTag, usize)> = LANGUAGES
        .iter()
        .map(|(tag, indicators)| {
            let score = indicators
                .iter()
                .map(|(indicator, weight)| code.matches(indicator).count() * weight)
                .sum();
            (*tag, score)
        })
        .collect();

    if code.contains('{') {
        if let Some((_, python)) = scores.iter_mut().find(|(t, _)| *t == LanguageTag::Python) {
            if *python > 0 && distinct_python_indicators(&code) >= PYTHON_BRACE_MIN_INDICATORS {
                *python += PYTHON_BRACE_BONUS;
            }
        }
    }

    LanguageScores { scores }
}

fn distinct_python_indicators(lowered: &str) -> usize {
    PYTHON_INDICATORS
        .iter()
        .filter(|(indicator, _)| lowered.contains(indicator))
        .count()
}

/// Guess the language of an unlabeled snippet.
///
/// Ties between Python and another language go to Python when at least one
/// Python indicator occurs; any other tie is broken by the fixed order
/// python, javascript, html, css, sql.
pub fn guess_language(snippet: &str) -> LanguageTag {
    let scores = score_languages(snippet);
    let max = scores.max();

    if max == 0 {
        return if looks_like_indented_python(snippet) {
            LanguageTag::Python
        } else {
            LanguageTag::Text
        };
    }

    let candidates: Vec<LanguageTag> = scores
        .scores
        .iter()
        .filter(|(_, s)| *s == max)
        .map(|(t, _)| *t)
        .collect();

    if candidates.len() > 1 && candidates.contains(&LanguageTag::Python) {
        let lowered = snippet.trim().to_lowercase();
        if distinct_python_indicators(&lowered) > 0 {
            return LanguageTag::Python;
        }
    }

    candidates[0]
}

/// Whitespace fallback for snippets no indicator recognised.
fn looks_like_indented_python(snippet: &str) -> bool {
    let indented = snippet
        .lines()
        .any(|line| line.starts_with("  ") || line.starts_with('\t'));
    let lowered = snippet.to_lowercase();
    indented && (lowered.contains(':') || lowered.contains("def") || lowered.contains("class"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_function() {
        assert_eq!(guess_language("def foo():\n    pass"), LanguageTag::Python);
    }

    #[test]
    fn test_sql_query() {
        assert_eq!(guess_language("SELECT * FROM t WHERE x=1"), LanguageTag::Sql);
    }

    #[test]
    fn test_javascript() {
        let code = "const add = (a, b) => a + b;\nconsole.log(add(1, 2));";
        assert_eq!(guess_language(code), LanguageTag::JavaScript);
    }

    #[test]
    fn test_html() {
        let code = "<html>\n<body>\n<div class=\"x\">hi</div>\n</body>\n</html>";
        assert_eq!(guess_language(code), LanguageTag::Html);
    }

    #[test]
    fn test_css() {
        let code = "body {\n  margin: 0;\n  padding: 4px;\n  color: red;\n}";
        assert_eq!(guess_language(code), LanguageTag::Css);
    }

    #[test]
    fn test_python_dict_literal_gets_bonus() {
        let code = "import json\nfrom x import y\ndef f():\n    return {'a': 1}";
        let scores = score_languages(code);
        // import 2x2 + from 2 + def 3 + return 1 + bonus 2
        assert_eq!(scores.get(LanguageTag::Python), 12);
        assert_eq!(guess_language(code), LanguageTag::Python);
    }

    #[test]
    fn test_whitespace_fallback() {
        assert_eq!(guess_language("foo:\n    bar"), LanguageTag::Python);
        assert_eq!(guess_language("just some words"), LanguageTag::Text);
        assert_eq!(guess_language(""), LanguageTag::Text);
    }

    #[test]
    fn test_tie_prefers_python_when_indicator_present() {
        // "#" scores 1 for both python and css
        assert_eq!(guess_language("# heading"), LanguageTag::Python);
    }

    #[test]
    fn test_tie_without_python_uses_priority_order() {
        // javascript "let " = 2, sql "update " = 2
        assert_eq!(guess_language("let update x"), LanguageTag::JavaScript);
    }
}
