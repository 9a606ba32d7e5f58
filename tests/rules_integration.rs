//! Integration tests for the rule engine and prompt assembly.

use codechat::classify::{ContentType, FileRef};
use codechat::prompt::{
    build_interaction_prompt, truncate_prompt, PromptRequest, PromptTemplate, Turn,
    TRUNCATION_MARKER,
};
use codechat::rules::{suggest_rule_categories, ActiveRules, RuleBook, SuggestContext};
use codechat::RuleError;

const PRESETS: &[Option<&str>] = &[
    None,
    Some("conversational"),
    Some("technical"),
    Some("full_stack"),
    Some("data_pipeline"),
    Some("no_such_preset"),
];

// =============================================================================
// Active rules
// =============================================================================

#[test]
fn test_code_rules_always_keep_mandatory() {
    let book = RuleBook::builtin();
    for preset in PRESETS {
        let rules = book.get_active_rules(ContentType::Code, *preset);
        assert!(rules.contains("no_omissions"), "preset {:?}", preset);
        assert!(rules.contains("maintain_style"), "preset {:?}", preset);
    }
}

#[test]
fn test_every_content_type_keeps_its_mandatory_rules() {
    let book = RuleBook::builtin();
    for content_type in [
        ContentType::Conversation,
        ContentType::Code,
        ContentType::Data,
        ContentType::General,
    ] {
        let mandatory = book.mandatory(content_type.as_str());
        for preset in PRESETS {
            let rules = book.get_active_rules(content_type, *preset);
            assert!(rules.is_superset(&mandatory), "{:?} {:?}", content_type, preset);
        }
    }
}

#[test]
fn test_technical_preset_narrows_code_rules() {
    let book = RuleBook::builtin();
    let rules = book.get_active_rules(ContentType::Code, Some("technical"));
    let ids: Vec<&str> = rules.iter().collect();
    assert_eq!(ids, vec!["maintain_style", "no_omissions", "practical_improvements"]);
}

#[test]
fn test_unknown_preset_uses_defaults() {
    let book = RuleBook::builtin();
    assert_eq!(
        book.get_active_rules(ContentType::Data, Some("no_such_preset")),
        book.get_active_rules(ContentType::Data, None)
    );
}

#[test]
fn test_merge_covers_mandatory_of_each_category() {
    let book = RuleBook::builtin();
    let code = book.merge_rule_sets(&["code"]);
    let both = book.merge_rule_sets(&["code", "data"]);

    assert!(both.is_superset(&code));
    assert!(both.is_superset(&book.mandatory("data")));
    assert!(both.contains("statistical_relevance"));
}

// =============================================================================
// Enabling and disabling
// =============================================================================

#[test]
fn test_enable_and_disable_round() {
    let book = RuleBook::builtin();
    let mut rules = book.get_active_rules(ContentType::Code, Some("technical"));

    assert_eq!(rules.enable(&book, "actual_code_focus", 15), Ok(true));
    assert_eq!(rules.enable(&book, "actual_code_focus", 15), Ok(false));
    assert_eq!(rules.disable(&book, "actual_code_focus"), Ok(true));
    assert_eq!(rules.disable(&book, "actual_code_focus"), Ok(false));
}

#[test]
fn test_enable_unknown_rule() {
    let book = RuleBook::builtin();
    let mut rules = ActiveRules::new();
    assert_eq!(
        rules.enable(&book, "write_poetry", 15),
        Err(RuleError::UnknownRule("write_poetry".to_string()))
    );
}

#[test]
fn test_mandatory_rule_cannot_be_disabled() {
    let book = RuleBook::builtin();
    let mut rules = book.get_active_rules(ContentType::Code, None);
    assert_eq!(
        rules.disable(&book, "no_omissions"),
        Err(RuleError::MandatoryRuleDisabled("no_omissions".to_string()))
    );
    assert!(rules.contains("no_omissions"));
}

#[test]
fn test_enable_past_limit_leaves_set_untouched() {
    let book = RuleBook::builtin();
    let mut rules = book.get_active_rules(ContentType::Code, Some("technical"));
    let before = rules.clone();

    assert_eq!(
        rules.enable(&book, "actual_code_focus", 3),
        Err(RuleError::TooManyRules { limit: 3 })
    );
    assert_eq!(rules, before);
}

// =============================================================================
// Suggestions
// =============================================================================

#[test]
fn test_suggestions_start_with_classifier_category() {
    let files = vec![FileRef::new("report.csv"), FileRef::new("settings.yml")];
    let suggested = suggest_rule_categories(&SuggestContext {
        user_input: Some("def load(path):\n    return open(path).read()"),
        available_files: Some(&files),
    });
    assert_eq!(suggested, vec!["code", "data", "config"]);
}

#[test]
fn test_conversation_with_code_files() {
    let files = vec![FileRef::new("server.py")];
    let suggested = suggest_rule_categories(&SuggestContext {
        user_input: Some("thanks, that was really helpful"),
        available_files: Some(&files),
    });
    assert_eq!(suggested, vec!["conversation", "code"]);
}

// =============================================================================
// Prompt assembly
// =============================================================================

#[test]
fn test_code_prompt_lists_rules_and_files() {
    let book = RuleBook::builtin();
    let rules = book.get_active_rules(ContentType::Code, None);
    let files = vec![FileRef {
        name: "app.py".to_string(),
        language: Some("python".to_string()),
    }];
    let request = PromptRequest {
        content: "def handler(event):\n    return event['body']",
        template: PromptTemplate::CodeAnalysis,
        available_files: &files,
        active_rules: Some(&rules),
        history: &[],
    };

    let prompt = build_interaction_prompt(&book, &request);
    assert!(prompt.starts_with("Analyze the code considering:"));
    assert!(prompt.contains("Best practices for Python"));
    assert!(prompt.contains("SQL injection"));
    assert!(prompt.contains("- Do not omit parts of the code with (...)"));
    assert!(prompt.contains("- app.py (python)"));
    assert!(!prompt.contains('{'));
}

#[test]
fn test_conversation_prompt_keeps_last_turns() {
    let book = RuleBook::builtin();
    let history: Vec<Turn> = (1..=5)
        .map(|i| Turn {
            role: "user".to_string(),
            content: format!("message {i}"),
        })
        .collect();
    let request = PromptRequest {
        content: "ciao, come stai?",
        history: &history,
        ..Default::default()
    };

    let prompt = build_interaction_prompt(&book, &request);
    assert!(prompt.starts_with("Keep the conversation natural and contextual."));
    assert!(!prompt.contains("message 2"));
    assert!(prompt.contains("user: message 3"));
    assert!(prompt.contains("user: message 5"));
}

#[test]
fn test_truncated_prompt_ends_with_marker() {
    let text = "first line of the prompt\nsecond line of the prompt that runs long";
    let truncated = truncate_prompt(text, 30);
    assert_eq!(truncated, format!("first line of the prompt{TRUNCATION_MARKER}"));
    assert_eq!(truncate_prompt(text, 500), text);
}
