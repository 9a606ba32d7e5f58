//! Content-type classification of chat messages.
//!
//! Checks run in a fixed order and the first match wins:
//! conversational phrasing, code signatures, structured-data signatures,
//! then the file context supplied by the caller.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Short messages below this many whitespace tokens may be conversational.
const SHORT_MESSAGE_TOKENS: usize = 15;

/// Coarse classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Conversation,
    Code,
    Data,
    General,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Conversation => "conversation",
            ContentType::Code => "code",
            ContentType::Data => "data",
            ContentType::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conversation" => Some(ContentType::Conversation),
            "code" => Some(ContentType::Code),
            "data" => Some(ContentType::Data),
            "general" => Some(ContentType::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file known to the conversation, identified by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl FileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: None,
        }
    }

    /// Lowercased extension without the dot, empty when absent.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }
}

/// Optional context used when the text itself carries no signal.
#[derive(Debug, Clone, Default)]
pub struct ClassifyContext<'a> {
    /// Explicit file extension, without the dot.
    pub file_type: Option<&'a str>,
    pub available_files: Option<&'a [FileRef]>,
}

/// Extension to content type mapping used by the context fallback.
static EXTENSION_CONTENT_TYPES: phf::Map<&'static str, ContentType> = phf::phf_map! {
    "py" => ContentType::Code,
    "js" => ContentType::Code,
    "ts" => ContentType::Code,
    "java" => ContentType::Code,
    "cpp" => ContentType::Code,
    "json" => ContentType::Data,
    "csv" => ContentType::Data,
    "yaml" => ContentType::Data,
    "yml" => ContentType::Data,
    "xml" => ContentType::Data,
};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid builtin pattern {p:?}: {e}")))
        .collect()
}

/// Greetings, questions and politeness, matched against lowercased text.
static CONVERSATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(ciao|salve|hey|hi|hello|buongiorno|buonasera)\b",
        r"\?\s*$",
        r"\b(grazie|prego|per favore|thanks|thank you|please)\b",
        r"^(come|cosa|quando|dove|perché|perche|chi|how|what|when|where|why|who)\b",
    ])
});

/// Signals that a short message is a technical request.
static TECHNICAL_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(function|class|def|var|let|const)\b",
        r"```",
        r"\b(analizza|ottimizza|debug|analyze|analyse|optimize|refactor)\b",
    ])
});

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // fenced block
        r"```\w*\n[\s\S]*?\n```",
        // declarations
        r"\b(function|class|def|var|let|const)\b\s+\w+",
        // import / require
        r"\b(import|require|from)\b\s+[\w\s,{}]+",
        // name(args) {
        r"[\w\s]*\([^)]*\)\s*\{",
        r"=>",
        r"\b(if|for|while|switch)\b\s*\(",
        // html tag pair
        r"<[\w\s=\x22']*>.*?</[\w\s]*>",
        // indented line
        r"(?m)^[ \t]{2,}\w+",
    ])
});

static DATA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // JSON object / array
        r#"(?m)\{[\s\S]*".*?"[\s\S]*\}"#,
        r"(?m)\[[\s\S]*\{.*?\}[\s\S]*\]",
        // CSV row
        r"(?m)(?:\w+,){2,}\w+(?:\n|$)",
        // YAML key block
        r"(?m)^\w+:[ \t]*\n(?:[ \t]{2,}-[ \t]+.*\n)+",
        // pipe table row
        r"(?m)\|\s*[\w\s]+\s*\|.*\|",
    ])
});

/// Classify a message.
pub fn classify(text: &str, context: Option<&ClassifyContext<'_>>) -> ContentType {
    if is_conversational(text) {
        return ContentType::Conversation;
    }

    if contains_code(text) {
        return ContentType::Code;
    }

    if contains_structured_data(text) {
        return ContentType::Data;
    }

    if let Some(ctx) = context {
        if let Some(file_type) = ctx.file_type {
            return content_type_for_extension(file_type);
        }
        if let Some(files) = ctx.available_files {
            return content_type_from_files(files);
        }
    }

    ContentType::General
}

/// Conversational test.
///
/// Any message without a technical signal is conversation, whatever its
/// length or phrasing, which keeps prose away from the code and data
/// analysis paths. Code and data signatures count as technical signals
/// too, so a bare JSON document is never conversation.
pub fn is_conversational(text: &str) -> bool {
    let lowered = text.to_lowercase();
    !has_technical_signal(text, &lowered)
}

/// Short message with a greeting, question or politeness phrase.
pub fn has_conversational_phrasing(text: &str) -> bool {
    let lowered = text.to_lowercase();
    text.split_whitespace().count() < SHORT_MESSAGE_TOKENS
        && CONVERSATION_PATTERNS.iter().any(|re| re.is_match(&lowered))
}

fn has_technical_signal(text: &str, lowered: &str) -> bool {
    TECHNICAL_INDICATORS.iter().any(|re| re.is_match(lowered))
        || contains_code(text)
        || contains_structured_data(text)
}

/// Whether the text matches any code signature.
pub fn contains_code(text: &str) -> bool {
    CODE_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Whether the text matches any structured-data signature.
pub fn contains_structured_data(text: &str) -> bool {
    DATA_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Map a file extension (with or without the dot) to a content type.
pub fn content_type_for_extension(ext: &str) -> ContentType {
    let ext = ext.trim_start_matches('.').to_lowercase();
    EXTENSION_CONTENT_TYPES
        .get(ext.as_str())
        .copied()
        .unwrap_or(ContentType::General)
}

/// First non-general content type among the files, in order.
pub fn content_type_from_files(files: &[FileRef]) -> ContentType {
    files
        .iter()
        .map(|f| content_type_for_extension(&f.extension()))
        .find(|t| *t != ContentType::General)
        .unwrap_or(ContentType::General)
}
