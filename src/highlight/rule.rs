//! Highlight rules and the ordered rule store
//!
//! The store is the single source of truth for which rules are active.
//! Any list a UI shows is a render of [`RuleStore::list`].

use serde::{Deserialize, Serialize};

use super::style::Color;
use crate::error::{HighlightError, Result};

/// A (pattern, color) pair driving one highlight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Case-insensitive regular expression
    pub pattern: String,
    /// Background color for matched lines
    pub color: Color,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, color: Color) -> Self {
        Self {
            pattern: pattern.into(),
            color,
        }
    }
}

/// Ordered set of rules, unique by pattern
#[derive(Debug, Default, Clone)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    ///
    /// Patterns are compared as literal strings; `"error"` and `"ERROR"`
    /// are distinct rules even though both match the same text.
    pub fn add(&mut self, pattern: &str, color: Color) -> Result<()> {
        if pattern.trim().is_empty() {
            return Err(HighlightError::EmptyPattern);
        }
        if self.contains(pattern) {
            return Err(HighlightError::Duplicate(pattern.to_string()));
        }
        self.rules.push(Rule::new(pattern, color));
        Ok(())
    }

    /// Remove the rule with this pattern, if present
    ///
    /// The color takes no part in identity. Returns the removed rule.
    pub fn remove(&mut self, pattern: &str, _color: Color) -> Option<Rule> {
        let idx = self.rules.iter().position(|r| r.pattern == pattern)?;
        Some(self.rules.remove(idx))
    }

    /// Remove all rules
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Replace the whole list, or leave it untouched if `rules` is invalid
    pub fn replace_all(&mut self, rules: Vec<Rule>) -> Result<()> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                return Err(HighlightError::EmptyPattern);
            }
            if rules[..i].iter().any(|r| r.pattern == rule.pattern) {
                return Err(HighlightError::Duplicate(rule.pattern.clone()));
            }
        }
        self.rules = rules;
        Ok(())
    }

    /// Ordered snapshot of the active rules
    pub fn list(&self) -> &[Rule] {
        &self.rules
    }

    /// Check whether a pattern is present
    pub fn contains(&self, pattern: &str) -> bool {
        self.rules.iter().any(|r| r.pattern == pattern)
    }

    /// Look up a rule by pattern
    pub fn get(&self, pattern: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
