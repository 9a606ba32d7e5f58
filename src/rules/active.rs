//! The set of rules active for one session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::RuleBook;
use crate::error::RuleError;

/// Ordered set of active rule ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveRules {
    rules: BTreeSet<String>,
}

impl ActiveRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }

    pub fn is_superset(&self, other: &ActiveRules) -> bool {
        self.rules.is_superset(&other.rules)
    }

    pub(crate) fn insert(&mut self, rule: impl Into<String>) {
        self.rules.insert(rule.into());
    }

    pub(crate) fn extend<I, S>(&mut self, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(rules.into_iter().map(Into::into));
    }

    /// Union with another set.
    pub fn union(mut self, other: &ActiveRules) -> ActiveRules {
        self.rules.extend(other.rules.iter().cloned());
        self
    }

    /// Enable a rule known to `book`.
    ///
    /// Returns `Ok(false)` when the rule was already active. Adding a rule
    /// past `limit` fails and leaves the set untouched.
    pub fn enable(&mut self, book: &RuleBook, rule: &str, limit: usize) -> Result<bool, RuleError> {
        if !book.knows(rule) {
            return Err(RuleError::UnknownRule(rule.to_string()));
        }
        if self.contains(rule) {
            return Ok(false);
        }
        if self.rules.len() >= limit {
            return Err(RuleError::TooManyRules { limit });
        }
        tracing::debug!(rule, "enabling rule");
        self.rules.insert(rule.to_string());
        Ok(true)
    }

    /// Disable a rule. Mandatory rules of any category cannot be disabled.
    ///
    /// Returns `Ok(false)` when the rule was not active.
    pub fn disable(&mut self, book: &RuleBook, rule: &str) -> Result<bool, RuleError> {
        if !book.knows(rule) {
            return Err(RuleError::UnknownRule(rule.to_string()));
        }
        if book.is_mandatory(rule) {
            return Err(RuleError::MandatoryRuleDisabled(rule.to_string()));
        }
        tracing::debug!(rule, "disabling rule");
        Ok(self.rules.remove(rule))
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveRules {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut rules = ActiveRules::new();
        rules.extend(iter);
        rules
    }
}

impl<'a> IntoIterator for &'a ActiveRules {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
