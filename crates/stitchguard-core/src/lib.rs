//! Stitchguard Core - content safety classification for a designer marketplace.
//!
//! Chat messages, reviews and product listings are screened for attempts to
//! move payment off the platform: account and card numbers, phone numbers,
//! payment-service handles and emails, and explicit solicitation phrases.
//!
//! # Usage
//!
//! ```
//! use stitchguard_core::{Category, ContentFilter};
//!
//! let filter = ContentFilter::with_defaults();
//!
//! let result = filter.classify("Call me at (555) 123-4567");
//! assert!(!result.is_allowed);
//! assert_eq!(result.matched_category, Some(Category::PhoneNumber));
//!
//! assert!(filter.classify("Love the stitching on this jacket").is_allowed);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod gate;

pub use classifier::{
    classify, contains_sensitive_info, filter_mask, validate_content, Category,
    ClassificationResult, ClassificationRule, CompiledRuleSet, ContentFilter, RuleMatch, RuleSet,
    Severity, DEFAULT_PLACEHOLDER,
};
pub use config::{FilterConfig, Preset};
pub use error::{ConfigError, GateError, RuleError};
pub use gate::{FormValidator, SubmissionGate};
