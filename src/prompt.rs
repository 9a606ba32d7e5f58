//! System-prompt assembly from content type, active rules and files.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, contains_code, ClassifyContext, ContentType, FileRef};
use crate::rules::{ActiveRules, RuleBook};

/// Marker appended by [`truncate_prompt`].
pub const TRUNCATION_MARKER: &str = "\n[Text truncated for length]";

/// Number of trailing conversation turns carried into the prompt.
const HISTORY_TURNS: usize = 3;

const CONVERSATIONAL_PROMPT: &str = "Keep the conversation natural and contextual.
- Answer in a way that fits the context
- Use a conversational tone when appropriate
- Avoid technical analysis nobody asked for
- Keep the flow of the conversation";

const GENERAL_PROMPT: &str = "Analyze the content and give a detailed, useful answer.";

const CODE_ANALYSIS_PROMPT: &str = "Analyze the code considering:
1. Structure and organization of the code
2. Potential security problems ({security_concerns})
3. Performance and optimizations ({performance_tips})
4. Best practices for {language}
5. Suggestions to improve maintainability
6. Cyclomatic complexity
7. Design patterns in use

If several files are present, also analyze:
1. Dependencies between the files
2. Consistency of the coding style
3. Possible integration problems
4. Suggestions for a better organization";

const CODE_EXPLANATION_PROMPT: &str = "Explain the code highlighting:
1. General behaviour and purpose
2. Execution flow
3. Patterns and techniques in use
4. Key points and implementation decisions
5. Data structures and algorithms

If the code is part of a larger project:
1. Relations with other components
2. Role in the overall context
3. Interactions with other parts of the system";

const DATA_ANALYSIS_PROMPT: &str = "Analyze the data considering:
1. Structure and format of the data
2. Key descriptive statistics
3. Evident patterns and trends
4. Anomalies or outliers
5. Correlations between fields
6. Quality and completeness of the data

If several files are present:
1. Relations between the datasets
2. Consistency of the data
3. Possible integrations
4. Suggestions for optimization";

/// Extension (with dot) to display language.
static PROMPT_LANGUAGES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    ".py" => "Python",
    ".js" => "JavaScript",
    ".html" => "HTML",
    ".css" => "CSS",
    ".cpp" => "C++",
    ".java" => "Java",
};

/// Prompt template selected for non-conversational content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    #[default]
    General,
    CodeAnalysis,
    CodeExplanation,
    DataAnalysis,
}

impl PromptTemplate {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(PromptTemplate::General),
            "code_analysis" => Some(PromptTemplate::CodeAnalysis),
            "code_explanation" => Some(PromptTemplate::CodeExplanation),
            "data_analysis" => Some(PromptTemplate::DataAnalysis),
            _ => None,
        }
    }

    fn text(&self) -> &'static str {
        match self {
            PromptTemplate::General => GENERAL_PROMPT,
            PromptTemplate::CodeAnalysis => CODE_ANALYSIS_PROMPT,
            PromptTemplate::CodeExplanation => CODE_EXPLANATION_PROMPT,
            PromptTemplate::DataAnalysis => DATA_ANALYSIS_PROMPT,
        }
    }
}

/// One earlier message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

/// Everything the prompt builder looks at.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest<'a> {
    pub content: &'a str,
    pub template: PromptTemplate,
    pub available_files: &'a [FileRef],
    pub active_rules: Option<&'a ActiveRules>,
    pub history: &'a [Turn],
}

/// Security concerns worth mentioning for a display language.
pub fn security_concerns(language: &str) -> &'static str {
    match language {
        "Python" => "SQL injection, unsafe deserialization, unsanitized input handling",
        "JavaScript" => "XSS, CSRF, DOM injection, incorrect async handling",
        "HTML" => "XSS, CSRF, clickjacking, content security policy",
        "CSS" => "information disclosure, CSS injection",
        "C++" => "buffer overflow, memory leaks, integer overflow",
        "Java" => "unsafe serialization, SSRF, path traversal",
        _ => "common security problems",
    }
}

/// Performance hints for a display language.
pub fn performance_tips(language: &str) -> &'static str {
    match language {
        "Python" => "generators, loop optimization, memory management",
        "JavaScript" => "debouncing, throttling, DOM optimization",
        "HTML" => "lazy loading, rendering optimization",
        "CSS" => "selector optimization, animation performance",
        "C++" => "memory optimization, references, move semantics",
        "Java" => "garbage collection, thread pooling, caching",
        _ => "general optimizations",
    }
}

/// Display language of the first file with a recognised extension.
pub fn prompt_language(files: &[FileRef]) -> Option<&'static str> {
    files.iter().find_map(|f| {
        let ext = format!(".{}", f.extension());
        PROMPT_LANGUAGES.get(ext.as_str()).copied()
    })
}

fn content_type_of(request: &PromptRequest<'_>) -> ContentType {
    let ctx = ClassifyContext {
        file_type: None,
        available_files: Some(request.available_files),
    };
    classify(request.content, Some(&ctx))
}

/// Pick the system prompt and resolve its placeholders.
///
/// Without a recognised file language the placeholders resolve to generic
/// text rather than staying in the prompt.
pub fn select_system_prompt(request: &PromptRequest<'_>) -> String {
    if content_type_of(request) == ContentType::Conversation {
        return CONVERSATIONAL_PROMPT.to_string();
    }

    let language = prompt_language(request.available_files);
    let template = request.template.text();
    template
        .replace("{language}", language.unwrap_or("the language in use"))
        .replace("{security_concerns}", security_concerns(language.unwrap_or_default()))
        .replace("{performance_tips}", performance_tips(language.unwrap_or_default()))
}

/// Full interaction prompt: system prompt, rules, files, recent history.
pub fn build_interaction_prompt(book: &RuleBook, request: &PromptRequest<'_>) -> String {
    let mut sections = vec![select_system_prompt(request)];

    if let Some(rules) = request.active_rules.filter(|r| !r.is_empty()) {
        let described = book.describe(rules);
        if !described.is_empty() {
            sections.push("\nActive rules:".to_string());
            sections.extend(described.into_iter().map(|(_, text)| format!("- {text}")));
        }
    }

    if !request.available_files.is_empty() {
        sections.push("\nAvailable files:".to_string());
        for file in request.available_files {
            let language = file.language.as_deref().unwrap_or("unknown");
            sections.push(format!("- {} ({})", file.name, language));
        }
    }

    if !request.history.is_empty() {
        sections.push("\nConversation context:".to_string());
        let skip = request.history.len().saturating_sub(HISTORY_TURNS);
        for turn in &request.history[skip..] {
            sections.push(format!("{}: {}", turn.role, turn.content));
        }
    }

    sections.join("\n")
}

/// Drop control characters and collapse runs of whitespace.
pub fn sanitize_prompt(prompt: &str) -> String {
    let kept: String = prompt.chars().filter(|c| !c.is_control()).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut a prompt to at most `max_len` characters plus the truncation marker.
///
/// The cut lands on the last newline before the limit, else the last
/// sentence end, else the last space.
pub fn truncate_prompt(prompt: &str, max_len: usize) -> String {
    let limit = match prompt.char_indices().nth(max_len) {
        Some((idx, _)) => idx,
        None => return prompt.to_string(),
    };
    let head = &prompt[..limit];

    let cut = head
        .rfind('\n')
        .or_else(|| head.rfind(". "))
        .or_else(|| head.rfind(' '))
        .unwrap_or(limit);

    format!("{}{}", &prompt[..cut], TRUNCATION_MARKER)
}

/// Trim prose lines of a prompt containing code, leaving fenced code as is.
pub fn format_code_prompt(prompt: &str) -> String {
    if !contains_code(prompt) {
        return prompt.to_string();
    }

    let mut in_code = false;
    prompt
        .split('\n')
        .map(|line| {
            if line.trim().starts_with("```") {
                in_code = !in_code;
                line
            } else if in_code {
                line
            } else {
                line.trim()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
