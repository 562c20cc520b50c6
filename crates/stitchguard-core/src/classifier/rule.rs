//! Classification rules and ordered rule tables.

use serde::{Deserialize, Serialize};

use super::defaults;
use super::{Category, Severity};

fn default_enabled() -> bool {
    true
}

/// A single pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Unique identifier for this rule.
    pub id: String,
    /// Regular expression matched case-insensitively against the text.
    pub pattern: String,
    /// The category reported when the pattern matches.
    pub category: Category,
    /// Whether a match blocks the text or only flags it.
    #[serde(default)]
    pub severity: Severity,
    /// Whether this rule is currently evaluated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ClassificationRule {
    /// Creates a new enabled rule.
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        category: Category,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            category,
            severity,
            enabled: true,
        }
    }

    /// Creates a blocking rule.
    pub fn block(id: impl Into<String>, pattern: impl Into<String>, category: Category) -> Self {
        Self::new(id, pattern, category, Severity::Block)
    }

    /// Creates a warning rule.
    pub fn warn(id: impl Into<String>, pattern: impl Into<String>, category: Category) -> Self {
        Self::new(id, pattern, category, Severity::Warn)
    }

    /// Sets whether this rule is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// An ordered table of rules.
///
/// Order decides which blocking category is reported first when several
/// rules match the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// The rules in evaluation order.
    pub rules: Vec<ClassificationRule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates a rule set from the given rules, keeping their order.
    pub fn from_rules(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// The built-in marketplace rules.
    ///
    /// Blocks account, card and phone numbers, payment handles and emails,
    /// and off-platform payment requests. The blanket digit rule is present
    /// but disabled.
    pub fn marketplace_defaults() -> Self {
        Self {
            rules: defaults::marketplace_rules(),
        }
    }

    /// The marketplace rules with the blanket digit rule enabled.
    ///
    /// Rejects any numeral, as early chat builds did.
    pub fn strict_defaults() -> Self {
        let mut set = Self::marketplace_defaults();
        set.set_rule_enabled(defaults::NUMERIC_RULE_ID, true);
        set
    }

    /// Appends a rule to the end of the set.
    pub fn add_rule(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Removes a rule by ID.
    pub fn remove_rule(&mut self, id: &str) -> Option<ClassificationRule> {
        let pos = self.rules.iter().position(|r| r.id == id)?;
        Some(self.rules.remove(pos))
    }

    /// Gets a rule by ID.
    pub fn get_rule(&self, id: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Gets a mutable reference to a rule by ID.
    pub fn get_rule_mut(&mut self, id: &str) -> Option<&mut ClassificationRule> {
        self.rules.iter_mut().find(|r| r.id == id)
    }

    /// Enables or disables a rule by ID.
    pub fn set_rule_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.get_rule_mut(id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Updates the severity of a rule by ID.
    pub fn set_rule_severity(&mut self, id: &str, severity: Severity) -> bool {
        match self.get_rule_mut(id) {
            Some(rule) => {
                rule.severity = severity;
                true
            }
            None => false,
        }
    }

    /// Returns all rules for a specific category.
    pub fn rules_for_category(&self, category: Category) -> Vec<&ClassificationRule> {
        self.rules
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Returns all enabled rules, in order.
    pub fn enabled_rules(&self) -> Vec<&ClassificationRule> {
        self.rules.iter().filter(|r| r.enabled).collect()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
