//! Filter configuration loaded from JSON.
//!
//! ```json
//! {
//!   "preset": "marketplace",
//!   "placeholder": "[removed]",
//!   "disabled_rules": ["payment_instruction"],
//!   "enabled_rules": [],
//!   "severity_overrides": { "bypass_phrase": "warn" },
//!   "custom_rules": [
//!     { "id": "iban", "pattern": "\\b[a-z]{2}\\d{2}[a-z0-9]{11,30}\\b", "category": "bank_account" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassificationRule, ContentFilter, RuleSet, Severity, DEFAULT_PLACEHOLDER};
use crate::error::{ConfigError, Result};

/// Base rule table a config starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Built-in marketplace rules.
    #[default]
    Marketplace,
    /// Marketplace rules plus the blanket digit rule.
    Strict,
}

impl Preset {
    /// Returns the preset's rule set.
    pub fn rule_set(&self) -> RuleSet {
        match self {
            Preset::Marketplace => RuleSet::marketplace_defaults(),
            Preset::Strict => RuleSet::strict_defaults(),
        }
    }
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

/// Operator configuration for the content filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Base rule table.
    pub preset: Preset,
    /// Replacement text for masked spans.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Rule IDs to turn off.
    pub disabled_rules: Vec<String>,
    /// Rule IDs to turn on (applied before `disabled_rules`).
    pub enabled_rules: Vec<String>,
    /// Per-rule severity changes.
    pub severity_overrides: BTreeMap<String, Severity>,
    /// Extra rules evaluated after the preset's rules.
    pub custom_rules: Vec<ClassificationRule>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            placeholder: default_placeholder(),
            disabled_rules: Vec::new(),
            enabled_rules: Vec::new(),
            severity_overrides: BTreeMap::new(),
            custom_rules: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Parses a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        tracing::info!("Loaded filter config from {:?}", path);
        Ok(config)
    }

    /// Loads the given file, or the default location if it exists.
    ///
    /// Falls back to built-in defaults when no file is given and none exists
    /// at the default location. An explicitly given path must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                tracing::debug!("No filter config found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Platform config location, e.g. `~/.config/stitchguard/filter.json`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "stitchguard", "stitchguard")
            .map(|dirs| dirs.config_dir().join("filter.json"))
    }

    /// Builds the effective rule set.
    ///
    /// Unknown rule IDs in overrides are logged and ignored.
    pub fn rule_set(&self) -> RuleSet {
        let mut rules = self.preset.rule_set();
        for rule in &self.custom_rules {
            rules.add_rule(rule.clone());
        }

        for id in &self.enabled_rules {
            if !rules.set_rule_enabled(id, true) {
                tracing::warn!("Cannot enable unknown rule '{}'", id);
            }
        }
        for id in &self.disabled_rules {
            if !rules.set_rule_enabled(id, false) {
                tracing::warn!("Cannot disable unknown rule '{}'", id);
            }
        }
        for (id, severity) in &self.severity_overrides {
            if !rules.set_rule_severity(id, *severity) {
                tracing::warn!("Cannot override severity of unknown rule '{}'", id);
            }
        }

        rules
    }
}

impl ContentFilter {
    /// Creates a filter from an operator config.
    pub fn from_config(config: &FilterConfig) -> Self {
        ContentFilter::new(&config.rule_set()).with_placeholder(config.placeholder.clone())
    }
}
