//! Submission gating for text surfaces.
//!
//! A chat composer, review box or product form re-checks its text on every
//! edit, shows the message while the text is blocked, and only submits once
//! the text is allowed. These types hold that state so surfaces stay thin.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classifier::{ClassificationResult, ContentFilter};
use crate::error::GateError;

/// Gate for a single text input, such as a chat composer.
#[derive(Debug)]
pub struct SubmissionGate {
    filter: Arc<ContentFilter>,
    text: String,
    verdict: ClassificationResult,
}

impl SubmissionGate {
    /// Creates a gate with empty text.
    pub fn new(filter: Arc<ContentFilter>) -> Self {
        let verdict = filter.classify("");
        Self {
            filter,
            text: String::new(),
            verdict,
        }
    }

    /// Replaces the current text and re-classifies it.
    pub fn on_change(&mut self, text: impl Into<String>) -> &ClassificationResult {
        self.text = text.into();
        self.verdict = self.filter.classify(&self.text);
        &self.verdict
    }

    /// Returns the current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the verdict for the current text.
    pub fn verdict(&self) -> &ClassificationResult {
        &self.verdict
    }

    /// Returns the message to display under the input, if blocked.
    pub fn error_message(&self) -> Option<&str> {
        self.verdict.message.as_deref()
    }

    /// Returns true if the send button should be enabled.
    pub fn can_submit(&self) -> bool {
        self.verdict.is_allowed && !self.text.trim().is_empty()
    }

    /// Takes the trimmed text for sending and clears the input.
    ///
    /// Blocked or blank text stays in place so the user can edit it.
    pub fn submit(&mut self) -> Result<String, GateError> {
        if self.text.trim().is_empty() {
            return Err(GateError::Empty);
        }

        if let Some(category) = self.verdict.matched_category {
            tracing::debug!("Refusing submission blocked as {}", category);
            return Err(GateError::Rejected {
                category,
                message: category.message(),
            });
        }

        let sent = self.text.trim().to_string();
        self.on_change(String::new());
        Ok(sent)
    }
}

/// Per-field validation for multi-field forms (product listings, profiles).
#[derive(Debug)]
pub struct FormValidator {
    filter: Arc<ContentFilter>,
    errors: BTreeMap<String, String>,
}

impl FormValidator {
    /// Creates a validator with no recorded errors.
    pub fn new(filter: Arc<ContentFilter>) -> Self {
        Self {
            filter,
            errors: BTreeMap::new(),
        }
    }

    /// Validates one field, recording or clearing its error.
    ///
    /// Returns true if the value is allowed.
    pub fn validate_field(&mut self, field: impl Into<String>, value: &str) -> bool {
        let field = field.into();
        let result = self.filter.classify(value);

        match result.message {
            Some(message) => {
                self.errors.insert(field, message);
                false
            }
            None => {
                self.errors.remove(&field);
                true
            }
        }
    }

    /// Validates every field and returns true if all are allowed.
    pub fn validate_all<'a, I, K>(&mut self, fields: I) -> bool
    where
        I: IntoIterator<Item = (K, &'a str)>,
        K: Into<String>,
    {
        let mut all_valid = true;
        for (field, value) in fields {
            all_valid &= self.validate_field(field, value);
        }
        all_valid
    }

    /// Returns the error recorded for a field.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns all recorded errors, ordered by field name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns true if no field currently has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Forgets all recorded errors.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}
