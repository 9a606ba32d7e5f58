//! Heuristic classification of chat input.
//!
//! - `language`: indicator-table language guessing for unlabeled snippets
//! - `content`: conversation / code / data / general classification
//! - `blocks`: fenced code-block extraction and placeholder formatting

pub mod blocks;
pub mod content;
pub mod language;

pub use blocks::{
    detect_code_blocks, format_message_with_code, looks_like_code, CodeBlock, FormattedMessage,
};
pub use content::{
    classify, contains_code, contains_structured_data, content_type_for_extension,
    has_conversational_phrasing, is_conversational, ClassifyContext, ContentType, FileRef,
};
pub use language::{guess_language, score_languages, LanguageScores, LanguageTag};
