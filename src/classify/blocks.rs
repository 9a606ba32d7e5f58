//! Fenced code-block extraction from chat messages.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::language::guess_language;

/// Fenced block with an optional language tag on the opening fence line.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(\w+)?\n(.*?)\n```").unwrap_or_else(|e| panic!("fenced block regex: {e}"))
});

/// Any pair of fences, including single-line ones like ```x = 1```.
static BARE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```\n?(.*?)\n?```").unwrap_or_else(|e| panic!("bare fence regex: {e}"))
});

/// Substrings that suggest a multi-line message is code.
const CODE_INDICATORS: &[&str] = &[
    "    ", "\t", "()", "{", ";", "function", "class", "def ", "return", "import", "var ", "let ",
    "const ",
];

const MIN_CODE_INDICATORS: usize = 2;

/// A code block found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Tag from the opening fence, or the guessed language.
    pub language: String,
    pub code: String,
    /// The matched source text, fences included.
    pub original: String,
}

/// A message with its code blocks replaced by placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_blocks: Vec<CodeBlock>,
}

/// Extract fenced code blocks in order of appearance.
///
/// A tagged block keeps its tag and its code byte for byte. Untagged blocks
/// and fences the tagged pattern missed get a guessed language.
pub fn detect_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut found: Vec<(Range<usize>, CodeBlock)> = Vec::new();

    for caps in FENCED_BLOCK.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let code = body.as_str().to_string();
        let language = match caps.get(1) {
            Some(tag) => tag.as_str().to_string(),
            None => guess_language(&code).to_string(),
        };
        found.push((
            whole.range(),
            CodeBlock {
                language,
                code,
                original: whole.as_str().to_string(),
            },
        ));
    }

    for caps in BARE_FENCE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let span = whole.range();
        if found.iter().any(|(r, _)| overlaps(r, &span)) {
            continue;
        }
        let code = body.as_str().trim().to_string();
        found.push((
            span,
            CodeBlock {
                language: guess_language(&code).to_string(),
                code,
                original: whole.as_str().to_string(),
            },
        ));
    }

    found.sort_by_key(|(r, _)| r.start);
    found.into_iter().map(|(_, block)| block).collect()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Heuristic used for messages pasted without fences.
pub fn looks_like_code(text: &str) -> bool {
    if text.split('\n').count() < 2 {
        return false;
    }
    CODE_INDICATORS
        .iter()
        .filter(|indicator| text.contains(*indicator))
        .count()
        >= MIN_CODE_INDICATORS
}

/// Replace every code block with a numbered placeholder.
pub fn format_message_with_code(message: &str) -> FormattedMessage {
    let blocks = detect_code_blocks(message);

    if !blocks.is_empty() {
        let mut content = message.to_string();
        for (i, block) in blocks.iter().enumerate() {
            content = content.replacen(&block.original, &format!("\n[Code block {}]\n", i + 1), 1);
        }
        return FormattedMessage {
            content: content.trim().to_string(),
            code_blocks: blocks,
        };
    }

    if looks_like_code(message) {
        let language = guess_language(message).to_string();
        return FormattedMessage {
            content: format!("[{language} code]"),
            code_blocks: vec![CodeBlock {
                language,
                code: message.to_string(),
                original: message.to_string(),
            }],
        };
    }

    FormattedMessage {
        content: message.to_string(),
        code_blocks: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_block_round_trip() {
        let text = "look:\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\nthanks";
        let blocks = detect_code_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[0].code, "fn main() {\n    println!(\"hi\");\n}");
    }

    #[test]
    fn test_untagged_block_is_guessed() {
        let text = "```\nSELECT id FROM users WHERE age > 3\n```";
        let blocks = detect_code_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "sql");
    }

    #[test]
    fn test_inline_fence() {
        let blocks = detect_code_blocks("try ```def f(): pass``` maybe");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "def f(): pass");
        assert_eq!(blocks[0].language, "python");
    }

    #[test]
    fn test_blocks_in_order_of_appearance() {
        let text = "```\nlet x = 1;\n```\nand\n```python\nx = 1\n```";
        let blocks = detect_code_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "javascript");
        assert_eq!(blocks[1].language, "python");
    }

    #[test]
    fn test_format_replaces_blocks() {
        let text = "before\n```python\nx = 1\n```\nafter";
        let formatted = format_message_with_code(text);
        assert_eq!(formatted.content, "before\n\n[Code block 1]\n\nafter");
        assert_eq!(formatted.code_blocks.len(), 1);
    }

    #[test]
    fn test_format_unfenced_code() {
        let text = "def f(x):\n    return x";
        let formatted = format_message_with_code(text);
        assert_eq!(formatted.content, "[python code]");
        assert_eq!(formatted.code_blocks[0].code, text);
    }

    #[test]
    fn test_format_plain_text_untouched() {
        let formatted = format_message_with_code("just a question");
        assert_eq!(formatted.content, "just a question");
        assert!(formatted.code_blocks.is_empty());
    }

    #[test]
    fn test_looks_like_code_needs_two_lines() {
        assert!(!looks_like_code("def f(): return 1"));
        assert!(looks_like_code("def f():\n    return 1"));
    }
}
