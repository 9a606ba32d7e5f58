//! codechat - analysis core of a chat-based coding assistant.
//!
//! codechat decides how a message should be handled before it reaches a
//! language model, and analyzes the code that flows through the
//! conversation.
//!
//! # Architecture
//!
//! - `classify`: content-type classification, language guessing and fenced
//!   code-block extraction
//! - `rules`: rule books, presets and the active rule set of a session
//! - `prompt`: system-prompt assembly from the active rules
//! - `analysis`: tree-sitter based code analysis (Python) with line-based
//!   style, pattern and security checks
//! - `diff`: ndiff-style line diffs and change summaries
//! - `settings`: YAML settings schema
//! - `report`: Output formatting (text, JSON)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for the Python analyzer. Implement the
//! `SyntaxAnalyzer` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod diff;
pub mod error;
pub mod prompt;
pub mod report;
pub mod rules;
pub mod settings;

pub use analysis::{
    AnalysisOptions, AnalysisResult, ClassInfo, CodeAnalyzer, CodeStats, Complexity,
    FunctionInfo, SyntaxAnalyzer, VersionChange,
};
pub use classify::{
    classify, detect_code_blocks, format_message_with_code, guess_language, CodeBlock,
    ContentType, FileRef, LanguageTag,
};
pub use diff::{ndiff, summarize};
pub use error::{ConfigError, RuleError};
pub use prompt::{build_interaction_prompt, PromptRequest, PromptTemplate};
pub use rules::{suggest_rule_categories, ActiveRules, RuleBook, RuleCategory, RulePreset};
pub use settings::Settings;
