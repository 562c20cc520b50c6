//! The content filter: verdicts and masking over a compiled rule set.

use std::time::Instant;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{Category, ClassificationRule, CompiledRuleSet, RuleSet, Severity};

/// Replacement text for masked spans.
pub const DEFAULT_PLACEHOLDER: &str = "***FILTERED***";

static DEFAULT_FILTER: Lazy<ContentFilter> = Lazy::new(ContentFilter::with_defaults);

/// A single rule hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// ID of the rule that matched.
    pub rule_id: String,
    /// Category of the rule.
    pub category: Category,
    /// Severity of the rule.
    pub severity: Severity,
    /// The first text the rule matched.
    pub matched_text: String,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset where the match ends.
    pub end: usize,
}

/// Verdict for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// True iff no blocking rule matched.
    pub is_allowed: bool,
    /// Category of the first blocking match, in rule order.
    pub matched_category: Option<Category>,
    /// User-facing explanation when the text is blocked.
    pub message: Option<String>,
    /// Every rule that matched, blocking or not, in rule order.
    pub matches: Vec<RuleMatch>,
}

impl ClassificationResult {
    /// Creates an allowed result with no matches.
    pub fn allowed() -> Self {
        Self {
            is_allowed: true,
            matched_category: None,
            message: None,
            matches: Vec::new(),
        }
    }

    /// Builds the verdict from the matches of one evaluation.
    pub fn from_matches(matches: Vec<RuleMatch>) -> Self {
        let matched_category = matches
            .iter()
            .find(|m| m.severity == Severity::Block)
            .map(|m| m.category);

        Self {
            is_allowed: matched_category.is_none(),
            matched_category,
            message: matched_category.map(|c| c.message()),
            matches,
        }
    }

    /// Returns true if any rule matched, including warnings.
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Returns the matches of warn-severity rules.
    pub fn warnings(&self) -> Vec<&RuleMatch> {
        self.matches
            .iter()
            .filter(|m| m.severity == Severity::Warn)
            .collect()
    }

    /// Returns matches for a specific category.
    pub fn matches_for(&self, category: Category) -> Vec<&RuleMatch> {
        self.matches
            .iter()
            .filter(|m| m.category == category)
            .collect()
    }

    /// Returns true if the given category matched at any severity.
    pub fn matched(&self, category: Category) -> bool {
        self.matches.iter().any(|m| m.category == category)
    }
}

/// Screens free text against a compiled rule set.
///
/// Immutable after construction and safe to share across threads; compile
/// once and call [`classify`](Self::classify) on every keystroke.
#[derive(Debug)]
pub struct ContentFilter {
    compiled: CompiledRuleSet,
    placeholder: String,
}

impl ContentFilter {
    /// Creates a filter from an ordered rule set.
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            compiled: CompiledRuleSet::compile(rules),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Creates a filter with the built-in marketplace rules.
    pub fn with_defaults() -> Self {
        Self::new(&RuleSet::marketplace_defaults())
    }

    /// Creates a filter with the strict rules (every digit blocked).
    pub fn strict() -> Self {
        Self::new(&RuleSet::strict_defaults())
    }

    /// Returns the process-wide filter built from the default rules.
    pub fn shared() -> &'static ContentFilter {
        &DEFAULT_FILTER
    }

    /// Sets the text that replaces masked spans.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Returns the masking placeholder.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Returns the compiled rules, including skipped-rule errors.
    pub fn compiled(&self) -> &CompiledRuleSet {
        &self.compiled
    }

    /// Classifies the given text.
    ///
    /// Blank text is always allowed. Never fails: bad rules were dropped at
    /// compile time.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let start = Instant::now();

        if text.trim().is_empty() {
            return ClassificationResult::allowed();
        }

        let matches = self.compiled.find_matches(text);
        let result = ClassificationResult::from_matches(matches);

        if let Some(category) = result.matched_category {
            tracing::debug!(
                "Blocked text as {} ({} rule matches, {}us)",
                category,
                result.matches.len(),
                start.elapsed().as_micros()
            );
        } else if result.has_matches() {
            tracing::debug!("Allowed text with {} warnings", result.matches.len());
        }

        result
    }

    /// Returns a copy of `text` with card, account, phone and digit spans
    /// replaced by the placeholder.
    ///
    /// Keyword and phrase matches are left in place.
    pub fn filter_mask(&self, text: &str) -> String {
        let spans = self.compiled.mask_spans(text);
        if spans.is_empty() {
            return text.to_string();
        }

        let mut masked = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end) in spans {
            masked.push_str(&text[cursor..start]);
            masked.push_str(&self.placeholder);
            cursor = end;
        }
        masked.push_str(&text[cursor..]);
        masked
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Classifies `text` against an ordered list of rules.
///
/// Compiles the rules on every call; hold a [`ContentFilter`] on hot paths.
pub fn classify(text: &str, rules: &[ClassificationRule]) -> ClassificationResult {
    ContentFilter::new(&RuleSet::from_rules(rules.to_vec())).classify(text)
}

/// Masks card, account, phone and digit spans of `text` using `rules`.
pub fn filter_mask(text: &str, rules: &[ClassificationRule]) -> String {
    ContentFilter::new(&RuleSet::from_rules(rules.to_vec())).filter_mask(text)
}

/// Classifies `text` with the shared default filter.
pub fn validate_content(text: &str) -> ClassificationResult {
    ContentFilter::shared().classify(text)
}

/// Returns true if the default rules block `text`.
pub fn contains_sensitive_info(text: &str) -> bool {
    !validate_content(text).is_allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ContentFilter {
        ContentFilter::with_defaults()
    }

    fn blocked_as(text: &str) -> Option<Category> {
        let result = filter().classify(text);
        assert_eq!(result.is_allowed, result.matched_category.is_none());
        result.matched_category
    }

    // === Blank input ===

    #[test]
    fn empty_and_whitespace_allowed() {
        for text in ["", " ", "\n\t  ", "\u{3000}"] {
            let result = filter().classify(text);
            assert!(result.is_allowed, "blocked {:?}", text);
            assert!(result.message.is_none());
            assert!(!result.has_matches());
        }
        assert!(ContentFilter::strict().classify("   ").is_allowed);
    }

    // === Numbers ===

    #[test]
    fn detects_bank_account_digits() {
        assert_eq!(
            blocked_as("my account is 12345678901 thanks"),
            Some(Category::BankAccount)
        );
        assert_eq!(
            blocked_as("routing 123456789012345678"),
            Some(Category::BankAccount)
        );
    }

    #[test]
    fn detects_account_digits_inside_tokens() {
        for text in [
            "acct1234567890",
            "ref_12345678901 for the wire",
            "IBAN GB82WEST12345698765432",
        ] {
            assert_eq!(blocked_as(text), Some(Category::BankAccount), "{}", text);
        }
    }

    #[test]
    fn detects_runs_longer_than_eighteen_digits() {
        assert_eq!(
            blocked_as("wire to 1234567890123456789"),
            Some(Category::BankAccount)
        );
    }

    #[test]
    fn nine_digits_not_bank_account() {
        let result = filter().classify("order 123456789 shipped");
        assert!(!result.matched(Category::BankAccount));
    }

    #[test]
    fn detects_grouped_credit_card() {
        assert_eq!(blocked_as("4111 1111 1111 1111"), Some(Category::CreditCard));
        assert_eq!(
            blocked_as("card: 4111-1111-1111-1111 exp soon"),
            Some(Category::CreditCard)
        );
    }

    #[test]
    fn contiguous_card_reports_bank_account_first() {
        let result = filter().classify("4111111111111111");
        assert_eq!(result.matched_category, Some(Category::BankAccount));
        assert!(result.matched(Category::CreditCard));
    }

    #[test]
    fn detects_phone_numbers() {
        assert_eq!(
            blocked_as("Call me at (555) 123-4567"),
            Some(Category::PhoneNumber)
        );
        assert_eq!(blocked_as("text 555.123.4567"), Some(Category::PhoneNumber));
        assert_eq!(
            blocked_as("whatsapp +44 207 946 0958"),
            Some(Category::PhoneNumber)
        );
    }

    #[test]
    fn phone_message_is_user_readable() {
        let result = filter().classify("Call me at (555) 123-4567");
        assert_eq!(
            result.message.as_deref(),
            Some("Your message contains a phone number, which is not allowed. Please remove it to continue.")
        );
    }

    // === Payment services ===

    #[test]
    fn detects_venmo_handle_with_digits() {
        let category = blocked_as("Send payment to my venmo @john1234");
        assert!(matches!(
            category,
            Some(Category::PaymentKeyword) | Some(Category::PaymentUsername)
        ));
    }

    #[test]
    fn detects_payment_keyword_near_digits() {
        assert_eq!(
            blocked_as("Zelle works, last four 9876"),
            Some(Category::PaymentKeyword)
        );
    }

    #[test]
    fn detects_digits_before_payment_keyword() {
        assert_eq!(
            blocked_as("4821 is my zelle pin"),
            Some(Category::PaymentKeyword)
        );
        assert_eq!(
            blocked_as("use 55012 on cash app"),
            Some(Category::PaymentKeyword)
        );
    }

    #[test]
    fn detects_payment_instruction() {
        assert_eq!(
            blocked_as("just transfer it to me instead"),
            Some(Category::PaymentInstruction)
        );
        assert_eq!(
            blocked_as("DEPOSIT the balance at my branch"),
            Some(Category::PaymentInstruction)
        );
    }

    #[test]
    fn detects_payment_email() {
        assert_eq!(
            blocked_as("reach me: jane.doe@paypal.com"),
            Some(Category::PaymentEmail)
        );
    }

    #[test]
    fn detects_payment_usernames() {
        assert_eq!(blocked_as("venmo: jane.doe"), Some(Category::PaymentUsername));
        assert_eq!(blocked_as("CashApp $janedoe"), Some(Category::PaymentUsername));
        assert_eq!(
            blocked_as("my venmo is @stitch-queen"),
            Some(Category::PaymentUsername)
        );
    }

    #[test]
    fn detects_bypass_phrases() {
        for text in [
            "can you pay me directly?",
            "Let's do an offline payment",
            "we could settle this outside the app",
            "that way we avoid the platform fees",
            "happy to bypass platform checkout",
            "off-platform is cheaper",
        ] {
            assert_eq!(blocked_as(text), Some(Category::BypassPhrase), "{}", text);
        }
    }

    #[test]
    fn keyword_rules_are_case_insensitive() {
        assert_eq!(blocked_as("PAY ME DIRECTLY"), Some(Category::BypassPhrase));
        assert_eq!(blocked_as("Venmo: Jane"), Some(Category::PaymentUsername));
    }

    // === Safe content (no false positives) ===

    #[test]
    fn safe_review() {
        assert!(filter().classify("I love this dress, the fit is perfect!").is_allowed);
    }

    #[test]
    fn safe_sizes_and_prices() {
        for text in [
            "Can you make this in size 8?",
            "Shipping takes 5 to 7 days",
            "The hem is 32 inches",
            "Ordered two, total was $120",
        ] {
            let result = filter().classify(text);
            assert!(result.is_allowed, "blocked {:?}: {:?}", text, result.message);
        }
    }

    #[test]
    fn safe_payment_service_mention_without_handle() {
        assert!(filter().classify("venmo is great but I'll use checkout").is_allowed);
        assert!(filter().classify("email me at jane@gmail.com").is_allowed);
    }

    #[test]
    fn safe_emoji_and_unicode() {
        assert!(filter().classify("Magnifique robe 👗✨ merci beaucoup").is_allowed);
    }

    #[test]
    fn strict_filter_blocks_any_digit() {
        let result = ContentFilter::strict().classify("Can you make this in size 8?");
        assert!(!result.is_allowed);
        assert_eq!(result.matched_category, Some(Category::NumericSequence));
        assert_eq!(
            result.message.as_deref(),
            Some("Your message contains a number, which is not allowed. Please remove it to continue.")
        );
    }

    // === Severity ===

    #[test]
    fn warn_rules_do_not_block() {
        let mut rules = RuleSet::marketplace_defaults();
        rules.set_rule_severity("phone_number_common", Severity::Warn);
        let filter = ContentFilter::new(&rules);

        let result = filter.classify("Call me at (555) 123-4567");
        assert!(result.is_allowed);
        assert!(result.message.is_none());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].category, Category::PhoneNumber);
    }

    #[test]
    fn first_blocking_rule_wins_over_earlier_warning() {
        let rules = vec![
            ClassificationRule::warn("fee_warn", r"\bfees?\b", Category::BypassPhrase),
            ClassificationRule::block("acct", r"\b\d{10,18}\b", Category::BankAccount),
        ];
        let result = classify("fees to 12345678901", &rules);
        assert!(!result.is_allowed);
        assert_eq!(result.matched_category, Some(Category::BankAccount));
        assert_eq!(result.matches.len(), 2);
    }

    #[test]
    fn rule_order_decides_reported_category() {
        let card = ClassificationRule::block(
            "card",
            r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
            Category::CreditCard,
        );
        let acct = ClassificationRule::block("acct", r"\b\d{10,18}\b", Category::BankAccount);

        let a = classify("4111111111111111", &[card.clone(), acct.clone()]);
        let b = classify("4111111111111111", &[acct, card]);
        assert_eq!(a.matched_category, Some(Category::CreditCard));
        assert_eq!(b.matched_category, Some(Category::BankAccount));
    }

    #[test]
    fn invalid_rule_does_not_disable_others() {
        let rules = vec![
            ClassificationRule::block("broken", r"[", Category::BypassPhrase),
            ClassificationRule::block("acct", r"\b\d{10,18}\b", Category::BankAccount),
        ];
        let result = classify("wire to 12345678901", &rules);
        assert_eq!(result.matched_category, Some(Category::BankAccount));
    }

    // === Purity ===

    #[test]
    fn classify_is_idempotent() {
        let filter = filter();
        for text in [
            "Send payment to my venmo @john1234",
            "I love this dress, the fit is perfect!",
            "",
        ] {
            let first = filter.classify(text);
            let second = filter.classify(text);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            assert_eq!(first, second);
        }
    }

    #[test]
    fn long_adversarial_input_completes() {
        let filter = filter();

        // keyword and digits are further apart than the 30 char window
        let text = format!("venmo{}1234", " ".repeat(100_000));
        assert!(filter.classify(&text).is_allowed);

        let digits = "9".repeat(100_000);
        assert_eq!(
            filter.classify(&digits).matched_category,
            Some(Category::BankAccount)
        );
    }

    // === Masking ===

    #[test]
    fn mask_replaces_exactly_the_account_span() {
        let masked = filter().filter_mask("wire to 12345678901 today");
        assert_eq!(masked, "wire to ***FILTERED*** today");
    }

    #[test]
    fn mask_covers_whole_long_digit_run() {
        let masked = filter().filter_mask("wire to acct1234567890123456789012 today");
        assert_eq!(masked, "wire to acct***FILTERED*** today");
    }

    #[test]
    fn mask_handles_card_and_phone() {
        let masked = filter().filter_mask("card 4111 1111 1111 1111 or call (555) 123-4567");
        assert_eq!(masked, "card ***FILTERED*** or call ***FILTERED***");
    }

    #[test]
    fn mask_leaves_keywords_and_clean_text() {
        let filter = filter();
        assert_eq!(
            filter.filter_mask("pay me directly via venmo: jane"),
            "pay me directly via venmo: jane"
        );
        assert_eq!(filter.filter_mask("size 8 please"), "size 8 please");
        assert_eq!(filter.filter_mask(""), "");
    }

    #[test]
    fn mask_with_custom_placeholder_and_unicode() {
        let filter = ContentFilter::with_defaults().with_placeholder("[removed]");
        assert_eq!(
            filter.filter_mask("héllo 👗 12345678901 ✨"),
            "héllo 👗 [removed] ✨"
        );
    }

    #[test]
    fn strict_mask_replaces_every_digit_run() {
        let masked = ContentFilter::strict().filter_mask("size 8, qty 2");
        assert_eq!(masked, "size ***FILTERED***, qty ***FILTERED***");
    }

    #[test]
    fn free_filter_mask_uses_given_rules() {
        let rules = vec![ClassificationRule::block(
            "acct",
            r"\b\d{10,18}\b",
            Category::BankAccount,
        )];
        assert_eq!(
            filter_mask("a 1234567890 b 555-123-4567", &rules),
            "a ***FILTERED*** b 555-123-4567"
        );
    }

    // === Shared filter ===

    #[test]
    fn validate_content_uses_defaults() {
        assert!(validate_content("Beautiful embroidery").is_allowed);
        assert!(contains_sensitive_info("pay me directly"));
        assert!(!contains_sensitive_info("size 8"));
    }

    #[test]
    fn result_serializes_with_snake_case_category() {
        let result = filter().classify("pay me directly");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_allowed"], false);
        assert_eq!(json["matched_category"], "bypass_phrase");
    }
}
