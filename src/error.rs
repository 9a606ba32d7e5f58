//! Error types for configuration loading and rule management.
//!
//! Classification and analysis never return errors: they degrade the affected
//! part of their result instead. Errors only come from loading settings and
//! from mutating a session's active rule set.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading or validating settings and rule books.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("rule category {category:?}: mandatory rule {rule:?} is not part of its default rules")]
    MandatoryNotDefault { category: String, rule: String },

    #[error("rule category {category:?}: rule {rule:?} has no description")]
    MissingDescription { category: String, rule: String },

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Failure while toggling rules in a session's active rule set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("rule {0:?} is mandatory and cannot be disabled")]
    MandatoryRuleDisabled(String),

    #[error("maximum number of active rules exceeded (limit {limit})")]
    TooManyRules { limit: usize },
}
