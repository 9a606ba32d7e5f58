//! Rule engine: which prompt rules apply to a message.
//!
//! A [`RuleBook`] holds rule categories (`code`, `conversation`, `data`,
//! `json`, `config`) and named presets. Everything here is a pure function
//! of the book and its inputs; the only mutable piece is a session's
//! [`ActiveRules`].

mod active;

pub use active::ActiveRules;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::classify::{classify, ClassifyContext, ContentType, FileRef};
use crate::error::ConfigError;

pub const CODE: &str = "code";
pub const CONVERSATION: &str = "conversation";
pub const DATA: &str = "data";
pub const JSON: &str = "json";
pub const CONFIG: &str = "config";

const CODE_EXTENSIONS: &[&str] = &["py", "js", "html", "css", "cpp", "java"];
const DATA_EXTENSIONS: &[&str] = &["json", "csv", "yaml", "yml"];
const CONFIG_EXTENSIONS: &[&str] = &["yml", "yaml", "conf", "ini", "env"];

/// Rules grouped under one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCategory {
    #[serde(default)]
    pub default: Vec<String>,
    #[serde(default)]
    pub mandatory: Vec<String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
}

impl RuleCategory {
    fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.mandatory
            .iter()
            .chain(self.default.iter())
            .map(String::as_str)
    }
}

/// A named overlay of enabled rules per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePreset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category name to enabled rule ids. Categories the book does not
    /// define are kept but never matched.
    #[serde(default)]
    pub enabled_rules: BTreeMap<String, Vec<String>>,
}

/// Rule categories and presets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub categories: BTreeMap<String, RuleCategory>,
    #[serde(default)]
    pub presets: BTreeMap<String, RulePreset>,
}

/// Inputs for [`suggest_rule_categories`].
#[derive(Debug, Clone, Default)]
pub struct SuggestContext<'a> {
    pub user_input: Option<&'a str>,
    pub available_files: Option<&'a [FileRef]>,
}

fn category(default: &[&str], mandatory: &[&str], description: &[(&str, &str)]) -> RuleCategory {
    RuleCategory {
        default: default.iter().map(|s| s.to_string()).collect(),
        mandatory: mandatory.iter().map(|s| s.to_string()).collect(),
        description: description
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn preset(name: &str, description: &str, enabled: &[(&str, &[&str])]) -> RulePreset {
    RulePreset {
        name: name.to_string(),
        description: description.to_string(),
        enabled_rules: enabled
            .iter()
            .map(|(cat, rules)| (cat.to_string(), rules.iter().map(|r| r.to_string()).collect()))
            .collect(),
    }
}

impl RuleBook {
    /// The built-in rule book.
    pub fn builtin() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            CODE.to_string(),
            category(
                &[
                    "no_omissions",
                    "no_overengineering",
                    "maintain_style",
                    "practical_improvements",
                    "actual_code_focus",
                ],
                &["no_omissions", "maintain_style"],
                &[
                    ("no_omissions", "Do not omit parts of the code with (...)"),
                    ("no_overengineering", "No unrequested over-engineering"),
                    ("maintain_style", "Keep the existing style and approach"),
                    ("practical_improvements", "Only practical, concrete improvements"),
                    ("actual_code_focus", "Focus on the actual code, no speculation"),
                ],
            ),
        );
        categories.insert(
            CONVERSATION.to_string(),
            category(
                &["natural_flow", "context_awareness", "appropriate_tone"],
                &["natural_flow", "context_awareness"],
                &[
                    ("natural_flow", "Keep the conversation flowing naturally"),
                    ("context_awareness", "Take the context of the discussion into account"),
                    ("appropriate_tone", "Use a tone that fits the context"),
                ],
            ),
        );
        categories.insert(
            DATA.to_string(),
            category(
                &[
                    "complete_analysis",
                    "show_insights",
                    "statistical_relevance",
                    "practical_visualization",
                ],
                &["complete_analysis", "show_insights"],
                &[
                    ("complete_analysis", "Show every step of the analysis"),
                    ("show_insights", "Highlight significant patterns and insights"),
                    ("statistical_relevance", "Include statistical relevance"),
                    ("practical_visualization", "Suggest useful visualizations"),
                ],
            ),
        );
        categories.insert(
            JSON.to_string(),
            category(
                &[
                    "complete_processing",
                    "show_transformations",
                    "structural_focus",
                    "optimization_suggestions",
                ],
                &["complete_processing", "structural_focus"],
                &[
                    ("complete_processing", "Process the data completely"),
                    ("show_transformations", "Show the data transformations"),
                    ("structural_focus", "Focus on the data structure"),
                    ("optimization_suggestions", "Suggest optimizations"),
                ],
            ),
        );
        categories.insert(
            CONFIG.to_string(),
            category(
                &["validation_check", "security_check"],
                &["security_check"],
                &[
                    ("validation_check", "Validate configuration keys and values"),
                    ("security_check", "Flag secrets and insecure settings"),
                ],
            ),
        );

        let mut presets = BTreeMap::new();
        presets.insert(
            "conversational".to_string(),
            preset(
                "Conversational Mode",
                "Tuned for natural conversation",
                &[(
                    CONVERSATION,
                    &["natural_flow", "context_awareness", "appropriate_tone"],
                )],
            ),
        );
        presets.insert(
            "technical".to_string(),
            preset(
                "Technical Analysis",
                "In-depth technical analysis",
                &[
                    (CODE, &["no_omissions", "maintain_style", "practical_improvements"]),
                    (DATA, &["complete_analysis", "show_insights"]),
                ],
            ),
        );
        presets.insert(
            "full_stack".to_string(),
            preset(
                "Full Stack Analysis",
                "Complete analysis for full stack applications",
                &[
                    (CODE, &["no_omissions", "maintain_style", "practical_improvements"]),
                    (DATA, &["complete_analysis", "show_insights"]),
                    ("api", &["security_check", "performance_check"]),
                ],
            ),
        );
        presets.insert(
            "data_pipeline".to_string(),
            preset(
                "Data Pipeline",
                "Analysis focused on data processing",
                &[
                    (DATA, &["complete_analysis", "show_insights", "statistical_relevance"]),
                    (JSON, &["complete_processing", "show_transformations"]),
                    (CONFIG, &["validation_check", "security_check"]),
                ],
            ),
        );

        Self {
            categories,
            presets,
        }
    }

    /// Overlay another book: categories and presets replace same-named ones.
    pub fn overlay(mut self, other: RuleBook) -> Self {
        self.categories.extend(other.categories);
        self.presets.extend(other.presets);
        self
    }

    /// Check that mandatory rules are defaults and every rule is described.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, cat) in &self.categories {
            if let Some(rule) = cat.mandatory.iter().find(|r| !cat.default.contains(r)) {
                return Err(ConfigError::MandatoryNotDefault {
                    category: name.clone(),
                    rule: rule.clone(),
                });
            }
            if let Some(rule) = cat.default.iter().find(|r| !cat.description.contains_key(*r)) {
                return Err(ConfigError::MissingDescription {
                    category: name.clone(),
                    rule: rule.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&RuleCategory> {
        self.categories.get(name)
    }

    pub fn preset(&self, name: &str) -> Option<&RulePreset> {
        self.presets.get(name)
    }

    /// Whether any category defines the rule.
    pub fn knows(&self, rule: &str) -> bool {
        self.categories
            .values()
            .any(|c| c.rule_ids().any(|r| r == rule))
    }

    /// Whether any category lists the rule as mandatory.
    pub fn is_mandatory(&self, rule: &str) -> bool {
        self.categories
            .values()
            .any(|c| c.mandatory.iter().any(|r| r == rule))
    }

    /// Mandatory rules of one category, empty when unknown.
    pub fn mandatory(&self, category: &str) -> ActiveRules {
        self.category(category)
            .map(|c| c.mandatory.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Union of mandatory and default rules of every known category.
    /// Unknown categories are skipped.
    pub fn merge_rule_sets<S: AsRef<str>>(&self, categories: &[S]) -> ActiveRules {
        let mut merged = ActiveRules::new();
        for name in categories {
            match self.category(name.as_ref()) {
                Some(cat) => merged.extend(cat.rule_ids()),
                None => tracing::debug!(category = name.as_ref(), "skipping unknown rule category"),
            }
        }
        merged
    }

    /// Rules for a content type, optionally narrowed by a preset.
    ///
    /// Mandatory rules are always included. A known preset contributes only
    /// its rules for the matching category; otherwise the category defaults
    /// are used. An unknown preset name falls back to the defaults.
    pub fn get_active_rules(&self, content_type: ContentType, preset: Option<&str>) -> ActiveRules {
        let name = content_type.as_str();
        let mut rules = self.mandatory(name);

        match preset.and_then(|p| self.preset(p)) {
            Some(preset) => {
                if let Some(enabled) = preset.enabled_rules.get(name) {
                    rules.extend(enabled.iter().cloned());
                }
            }
            None => {
                if let Some(cat) = self.category(name) {
                    rules.extend(cat.default.iter().cloned());
                }
            }
        }
        rules
    }

    /// Descriptions of the active rules, category by category.
    ///
    /// Each rule appears once, under the first category that describes it.
    pub fn describe(&self, rules: &ActiveRules) -> Vec<(String, String)> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for cat in self.categories.values() {
            for rule in &cat.default {
                if !rules.contains(rule) || seen.contains(rule.as_str()) {
                    continue;
                }
                if let Some(text) = cat.description.get(rule) {
                    seen.insert(rule.as_str());
                    out.push((rule.clone(), text.clone()));
                }
            }
        }
        out
    }
}

/// Categories suggested for a message and its files.
///
/// The classifier's category comes first, then `code`, `data` and `config`
/// from file extensions, each at most once.
pub fn suggest_rule_categories(ctx: &SuggestContext<'_>) -> Vec<&'static str> {
    let mut suggested: Vec<&'static str> = Vec::new();

    if let Some(input) = ctx.user_input {
        let classify_ctx = ClassifyContext {
            file_type: None,
            available_files: ctx.available_files,
        };
        match classify(input, Some(&classify_ctx)) {
            ContentType::Conversation => push_unique(&mut suggested, CONVERSATION),
            ContentType::Code => push_unique(&mut suggested, CODE),
            ContentType::Data => push_unique(&mut suggested, DATA),
            ContentType::General => {}
        }
    }

    if let Some(files) = ctx.available_files {
        let extensions: Vec<String> = files.iter().map(FileRef::extension).collect();
        let any_of = |set: &[&str]| extensions.iter().any(|e| set.contains(&e.as_str()));

        if any_of(CODE_EXTENSIONS) {
            push_unique(&mut suggested, CODE);
        }
        if any_of(DATA_EXTENSIONS) {
            push_unique(&mut suggested, DATA);
        }
        if any_of(CONFIG_EXTENSIONS) {
            push_unique(&mut suggested, CONFIG);
        }
    }

    suggested
}

fn push_unique(list: &mut Vec<&'static str>, category: &'static str) {
    if !list.contains(&category) {
        list.push(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rules: &[&str]) -> ActiveRules {
        rules.iter().copied().collect()
    }

    #[test]
    fn test_builtin_book_is_valid() {
        assert!(RuleBook::builtin().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mandatory_outside_default() {
        let mut book = RuleBook::builtin();
        if let Some(cat) = book.categories.get_mut(CODE) {
            cat.mandatory.push("ghost".to_string());
        }
        assert!(matches!(
            book.validate(),
            Err(ConfigError::MandatoryNotDefault { rule, .. }) if rule == "ghost"
        ));
    }

    #[test]
    fn test_get_active_rules_code_contains_mandatory_for_every_preset() {
        let book = RuleBook::builtin();
        let mandatory = set(&["no_omissions", "maintain_style"]);
        let mut presets: Vec<Option<&str>> = book.presets.keys().map(|k| Some(k.as_str())).collect();
        presets.push(None);
        presets.push(Some("unknown_preset"));

        for preset in presets {
            let rules = book.get_active_rules(ContentType::Code, preset);
            assert!(rules.is_superset(&mandatory), "preset {preset:?}");
        }
    }

    #[test]
    fn test_preset_only_contributes_matching_category() {
        let book = RuleBook::builtin();
        let rules = book.get_active_rules(ContentType::Conversation, Some("technical"));
        assert_eq!(rules, set(&["natural_flow", "context_awareness"]));

        let rules = book.get_active_rules(ContentType::Code, Some("technical"));
        assert!(rules.contains("practical_improvements"));
        assert!(!rules.contains("actual_code_focus"));
    }

    #[test]
    fn test_general_content_has_no_rules() {
        let book = RuleBook::builtin();
        assert!(book.get_active_rules(ContentType::General, None).is_empty());
    }

    #[test]
    fn test_merge_rule_sets_skips_unknown() {
        let book = RuleBook::builtin();
        let merged = book.merge_rule_sets(&["code", "api"]);
        assert_eq!(merged, book.merge_rule_sets(&["code"]));
        assert_eq!(merged.len(), 5);
    }

    #[test]
    fn test_merge_rule_sets_monotonic() {
        let book = RuleBook::builtin();
        let both = book.merge_rule_sets(&["code", "data"]);
        let expected = book.merge_rule_sets(&["code"]).union(&book.mandatory("data"));
        assert!(both.is_superset(&expected));
    }

    #[test]
    fn test_suggest_from_input_and_files() {
        let files = vec![FileRef::new("app.py"), FileRef::new("settings.yaml")];
        let cats = suggest_rule_categories(&SuggestContext {
            user_input: Some("ciao!"),
            available_files: Some(&files),
        });
        assert_eq!(cats, vec![CONVERSATION, CODE, DATA, CONFIG]);
    }

    #[test]
    fn test_suggest_never_duplicates() {
        let files = vec![FileRef::new("main.py")];
        let cats = suggest_rule_categories(&SuggestContext {
            user_input: Some("def f(x):\n    return x"),
            available_files: Some(&files),
        });
        assert_eq!(cats, vec![CODE]);
    }

    #[test]
    fn test_suggest_without_context() {
        assert!(suggest_rule_categories(&SuggestContext::default()).is_empty());
    }

    #[test]
    fn test_describe_in_category_order() {
        let book = RuleBook::builtin();
        let rules = set(&["natural_flow", "no_omissions"]);
        let described = book.describe(&rules);
        let ids: Vec<&str> = described.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["no_omissions", "natural_flow"]);
    }
}
