//! Settings file schema for codechat.
//!
//! Settings are optional: every field has a default, and a missing file is
//! the same as an empty one.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::DEFAULT_SNAPSHOT_CAPACITY;
use crate::error::ConfigError;
use crate::rules::RuleBook;

/// File names looked up in the working directory, in order.
pub const SETTINGS_FILE_NAMES: &[&str] = &["codechat.yaml", ".codechat.yaml"];

const DEFAULT_MAX_ACTIVE_RULES: usize = 15;
const DEFAULT_MAX_PROMPT_LENGTH: usize = 4000;
const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Top-level settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Preset applied when none is given on the command line.
    #[serde(default)]
    pub default_preset: Option<String>,
    /// Rule categories and presets overlaid on the built-in book.
    #[serde(default)]
    pub rules: Option<RuleBook>,
}

/// Size and count limits.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LimitsConfig {
    /// Maximum rules active at once (default: 15)
    #[serde(default)]
    pub max_active_rules: Option<usize>,
    /// Prompt length in characters before truncation (default: 4000)
    #[serde(default)]
    pub max_prompt_length: Option<usize>,
    /// Files larger than this are skipped by `analyze` (default: 5 MiB)
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

/// Toggles for the analyzer's optional checks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Style and anti-pattern checks (default: true)
    #[serde(default = "default_true")]
    pub code_quality_checks: bool,
    /// Extension-specific and credential checks (default: true)
    #[serde(default = "default_true")]
    pub security_checks: bool,
    /// Performance pattern checks (default: true)
    #[serde(default = "default_true")]
    pub performance_checks: bool,
    /// Snapshots kept for version-change analysis (default: 64)
    #[serde(default)]
    pub snapshot_capacity: Option<usize>,
    /// Glob patterns skipped when analyzing a directory
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            code_quality_checks: true,
            security_checks: true,
            performance_checks: true,
            snapshot_capacity: None,
            excluded_paths: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Parse settings from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an explicit path, or the first discovered settings file,
    /// or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover(Path::new(".")) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check limits and the rule book overlay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_active_rules == Some(0) {
            return Err(ConfigError::InvalidSetting {
                field: "limits.max_active_rules",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.analysis.snapshot_capacity == Some(0) {
            return Err(ConfigError::InvalidSetting {
                field: "analysis.snapshot_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        for pattern in &self.analysis.excluded_paths {
            globset::Glob::new(pattern).map_err(|e| ConfigError::InvalidSetting {
                field: "analysis.excluded_paths",
                reason: format!("invalid pattern {pattern:?}: {e}"),
            })?;
        }
        self.rule_book().validate()
    }

    /// The built-in rule book with any configured overlay applied.
    pub fn rule_book(&self) -> RuleBook {
        match &self.rules {
            Some(overlay) => RuleBook::builtin().overlay(overlay.clone()),
            None => RuleBook::builtin(),
        }
    }

    pub fn max_active_rules(&self) -> usize {
        self.limits.max_active_rules.unwrap_or(DEFAULT_MAX_ACTIVE_RULES)
    }

    pub fn max_prompt_length(&self) -> usize {
        self.limits.max_prompt_length.unwrap_or(DEFAULT_MAX_PROMPT_LENGTH)
    }

    pub fn max_file_size(&self) -> u64 {
        self.limits.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn snapshot_capacity(&self) -> usize {
        self.analysis
            .snapshot_capacity
            .unwrap_or(DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.analysis.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        self.analysis.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Find a settings file: `dir` first, then the user config directory.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    SETTINGS_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .or_else(user_settings_path)
}

fn user_settings_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "codechat")?;
    let path = dirs.config_dir().join("config.yaml");
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let yaml = r#"
limits:
  max_active_rules: 8
analysis:
  security_checks: false
  excluded_paths:
    - "**/venv/**"
rules:
  categories:
    code:
      default: [no_omissions, maintain_style]
      mandatory: [no_omissions]
      description:
        no_omissions: "Never elide code"
        maintain_style: "Keep the style"
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_active_rules(), 8);
        assert!(!settings.analysis.security_checks);
        assert!(settings.analysis.code_quality_checks);
        assert!(settings.is_path_excluded(Path::new("proj/venv/lib/x.py")));

        let book = settings.rule_book();
        assert_eq!(book.category("code").map(|c| c.default.len()), Some(2));
        // other categories survive the overlay
        assert!(book.category("data").is_some());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_active_rules(), 15);
        assert_eq!(settings.max_prompt_length(), 4000);
        assert_eq!(settings.snapshot_capacity(), 64);
        assert!(settings.analysis.performance_checks);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let settings: Settings = serde_yaml::from_str("analysis:\n  snapshot_capacity: 0\n").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { field: "analysis.snapshot_capacity", .. })
        ));
    }

    #[test]
    fn test_invalid_overlay_rejected() {
        let yaml = r#"
rules:
  categories:
    code:
      default: [no_omissions]
      mandatory: [maintain_style]
      description:
        no_omissions: "x"
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MandatoryNotDefault { .. })
        ));
    }
}
