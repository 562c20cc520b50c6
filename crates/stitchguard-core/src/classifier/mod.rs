//! Content classification for user-to-user text.
//!
//! This module detects payment details and off-platform payment requests in
//! chat messages, reviews and product fields.

mod category;
mod compiled;
mod defaults;
mod filter;
mod rule;

pub use category::{Category, Severity};
pub use compiled::CompiledRuleSet;
pub use filter::{
    classify, contains_sensitive_info, filter_mask, validate_content, ClassificationResult,
    ContentFilter, RuleMatch, DEFAULT_PLACEHOLDER,
};
pub use rule::{ClassificationRule, RuleSet};
