//! Compiled rule set for efficient matching.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

use super::{ClassificationRule, RuleMatch, RuleSet};
use crate::error::RuleError;

/// Upper bound on the compiled size of a single pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Upper bound on the compiled size of the combined prefilter set.
const SET_SIZE_LIMIT: usize = 8 << 20;

/// A rule paired with its compiled pattern.
struct CompiledRule {
    rule: ClassificationRule,
    regex: Regex,
}

/// Enabled rules compiled into matchers.
///
/// Compilation never fails as a whole: a rule with a bad pattern or a
/// duplicate ID is skipped, logged, and recorded in [`errors`](Self::errors).
pub struct CompiledRuleSet {
    /// Prefilter over every compiled pattern, when it fits the size limit.
    regex_set: Option<RegexSet>,
    /// Compiled rules in evaluation order, indexed like `regex_set`.
    rules: Vec<CompiledRule>,
    /// Rules that were skipped.
    errors: Vec<RuleError>,
    /// Position in the source rule set of each entry in `errors`.
    skipped_at: Vec<usize>,
}

impl CompiledRuleSet {
    /// Compiles the enabled rules of `rules`, keeping their order.
    pub fn compile(rules: &RuleSet) -> Self {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();
        let mut errors = Vec::new();
        let mut skipped_at = Vec::new();

        for (position, rule) in rules.rules.iter().enumerate().filter(|(_, r)| r.enabled) {
            if !seen.insert(rule.id.as_str()) {
                tracing::warn!("Skipping rule with duplicate id '{}'", rule.id);
                errors.push(RuleError::DuplicateId(rule.id.clone()));
                skipped_at.push(position);
                continue;
            }

            match build_regex(&rule.pattern) {
                Ok(regex) => compiled.push(CompiledRule {
                    rule: rule.clone(),
                    regex,
                }),
                Err(source) => {
                    tracing::warn!("Skipping rule '{}': {}", rule.id, source);
                    errors.push(RuleError::InvalidPattern {
                        rule_id: rule.id.clone(),
                        source,
                    });
                    skipped_at.push(position);
                }
            }
        }

        let regex_set = match RegexSetBuilder::new(compiled.iter().map(|c| c.regex.as_str()))
            .case_insensitive(true)
            .size_limit(SET_SIZE_LIMIT)
            .build()
        {
            Ok(set) => Some(set),
            Err(e) => {
                tracing::debug!("Rule prefilter unavailable, matching rules one by one: {}", e);
                None
            }
        };

        Self {
            regex_set,
            rules: compiled,
            errors,
            skipped_at,
        }
    }

    /// Returns the number of active (compiled) rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule compiled.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rules that were skipped during compilation.
    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }

    /// Returns why the rule at `position` in the source rule set was skipped.
    ///
    /// `None` for active and disabled rules.
    pub fn skipped_rule(&self, position: usize) -> Option<&RuleError> {
        self.skipped_at
            .iter()
            .position(|&p| p == position)
            .map(|i| &self.errors[i])
    }

    /// Returns the active rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Finds the first non-empty occurrence of every matching rule.
    ///
    /// Results follow rule order. Offsets index into `text`.
    pub fn find_matches(&self, text: &str) -> Vec<RuleMatch> {
        let candidates: Vec<usize> = match &self.regex_set {
            Some(set) => set.matches(text).iter().collect(),
            None => (0..self.rules.len()).collect(),
        };

        candidates
            .into_iter()
            .filter_map(|idx| {
                let compiled = &self.rules[idx];
                compiled
                    .regex
                    .find_iter(text)
                    .find(|m| !m.is_empty())
                    .map(|m| RuleMatch {
                        rule_id: compiled.rule.id.clone(),
                        category: compiled.rule.category,
                        severity: compiled.rule.severity,
                        matched_text: m.as_str().to_string(),
                        start: m.start(),
                        end: m.end(),
                    })
            })
            .collect()
    }

    /// Byte ranges matched by maskable rules, sorted and merged.
    ///
    /// Overlapping and touching spans collapse into one range.
    pub fn mask_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = self
            .rules
            .iter()
            .filter(|c| c.rule.category.is_maskable())
            .flat_map(|c| c.regex.find_iter(text))
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect();

        spans.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }
}

impl std::fmt::Debug for CompiledRuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRuleSet")
            .field("rules", &self.rules.iter().map(|c| &c.rule.id).collect::<Vec<_>>())
            .field("errors", &self.errors.len())
            .field("prefilter", &self.regex_set.is_some())
            .finish()
    }
}

fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
}
