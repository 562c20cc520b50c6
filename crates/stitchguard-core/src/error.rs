//! Error types for rule compilation, configuration and submission.

use std::path::PathBuf;

use thiserror::Error;

use crate::classifier::Category;

/// A rule that could not be activated.
///
/// These never fail classification. The offending rule is skipped and the
/// error is kept on the compiled rule set for operators to inspect.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule's pattern does not compile (or exceeds the size limit).
    #[error("Invalid pattern for rule '{rule_id}': {source}")]
    InvalidPattern {
        /// ID of the skipped rule.
        rule_id: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Another rule earlier in the set already uses this ID.
    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),
}

impl RuleError {
    /// Returns the ID of the rule this error refers to.
    pub fn rule_id(&self) -> &str {
        match self {
            RuleError::InvalidPattern { rule_id, .. } => rule_id,
            RuleError::DuplicateId(id) => id,
        }
    }
}

/// Errors that can occur while loading a filter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::FilterConfig`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a text surface refuses to submit its current text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Nothing to send.
    #[error("Text is empty")]
    Empty,

    /// A blocking rule matched.
    #[error("{message}")]
    Rejected {
        /// Category that caused the rejection.
        category: Category,
        /// User-facing explanation.
        message: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
