//! Security pattern tables, selected by file extension.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which extension-specific table applies to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityProfile {
    Python,
    JavaScript,
    Html,
    /// Only the generic credential table.
    Generic,
}

impl SecurityProfile {
    /// Profile for a lowercase extension without the dot.
    pub fn for_extension(ext: &str) -> Self {
        match ext {
            "py" | "pyw" | "pyi" => Self::Python,
            "js" | "ts" => Self::JavaScript,
            "html" => Self::Html,
            _ => Self::Generic,
        }
    }
}

type Table = Vec<(Regex, &'static str)>;

fn table(entries: &[(&str, &'static str)]) -> Table {
    entries
        .iter()
        .map(|(pattern, message)| {
            let regex = Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid security pattern {pattern:?}: {e}"));
            (regex, *message)
        })
        .collect()
}

static PYTHON: Lazy<Table> = Lazy::new(|| {
    table(&[
        (r"eval\s*\(", "Use of eval() - code injection risk"),
        (r"exec\s*\(", "Use of exec() - code injection risk"),
        (r"subprocess\.", "Use of subprocess - verify input sanitization"),
        (r"input\s*\(", "Use of input() - verify input validation"),
        (r"os\.system\s*\(", "Use of os.system() - command injection risk"),
        (r"pickle\.", "Use of pickle - unsafe deserialization risk"),
        (r"yaml\.load\s*\(", "Use of yaml.load() - use yaml.safe_load() instead"),
        (r"\.raw_input\s*\(", "Use of raw_input() - verify input validation"),
    ])
});

static JAVASCRIPT: Lazy<Table> = Lazy::new(|| {
    table(&[
        (r"eval\s*\(", "Use of eval() - code injection risk"),
        (r"innerHTML", "Use of innerHTML - XSS risk"),
        (r"document\.write\s*\(", "Use of document.write() - XSS risk"),
        (r"localStorage\.", "Use of localStorage - check for sensitive data"),
        (r"new\s+Function\s*\(", "Use of new Function() - code injection risk"),
    ])
});

static HTML: Lazy<Table> = Lazy::new(|| {
    table(&[
        (r"on\w+\s*=", "Inline event handler - XSS risk"),
        (r"javascript:", "JavaScript URI - XSS risk"),
    ])
});

/// `<script src="...">`; the URL is checked separately for `https:`.
static SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script\s+src=['"]([^'"]*)"#).expect("script src regex")
});

const INSECURE_SCRIPT: &str = "Script loaded over non-HTTPS - MITM risk";

static GENERIC: Lazy<Table> = Lazy::new(|| {
    table(&[
        (r"password\s*=", "Hardcoded credential: password in source"),
        (r"api_key\s*=", "Hardcoded credential: API key in source"),
        (r"secret\s*=", "Hardcoded credential: secret in source"),
        (r"token\s*=", "Hardcoded credential: token in source"),
    ])
});

fn scan(code: &str, table: &Table, issues: &mut Vec<String>) {
    issues.extend(
        table
            .iter()
            .filter(|(regex, _)| regex.is_match(code))
            .map(|(_, message)| message.to_string()),
    );
}

/// Extension-specific issues followed by generic credential issues.
pub fn check_security(code: &str, profile: SecurityProfile) -> Vec<String> {
    let mut issues = Vec::new();

    match profile {
        SecurityProfile::Python => scan(code, &PYTHON, &mut issues),
        SecurityProfile::JavaScript => scan(code, &JAVASCRIPT, &mut issues),
        SecurityProfile::Html => {
            scan(code, &HTML, &mut issues);
            let insecure = SCRIPT_SRC
                .captures_iter(code)
                .any(|c| c.get(1).is_some_and(|url| !url.as_str().starts_with("https:")));
            if insecure {
                issues.push(INSECURE_SCRIPT.to_string());
            }
        }
        SecurityProfile::Generic => {}
    }

    scan(code, &GENERIC, &mut issues);
    issues
}
