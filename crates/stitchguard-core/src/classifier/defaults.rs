//! Built-in marketplace rules.
//!
//! Every pattern uses bounded gaps between keywords and numbers. Matching is
//! case-insensitive, applied at compile time.

use super::{Category, ClassificationRule};

/// ID of the blanket digit rule, shipped disabled.
pub(crate) const NUMERIC_RULE_ID: &str = "numeric_any";

/// Default rule table, in evaluation order.
pub(crate) fn marketplace_rules() -> Vec<ClassificationRule> {
    vec![
        // Blocks sizes, prices and order numbers too, so it stays off unless
        // a surface opts into the strict preset.
        ClassificationRule::block(NUMERIC_RULE_ID, r"\d+", Category::NumericSequence)
            .with_enabled(false),
        ClassificationRule::block(
            "bank_account_digits",
            r"\d{10,}",
            Category::BankAccount,
        ),
        ClassificationRule::block(
            "credit_card_grouped",
            r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
            Category::CreditCard,
        ),
        ClassificationRule::block(
            "phone_number_common",
            r"(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b",
            Category::PhoneNumber,
        ),
        ClassificationRule::block(
            "payment_service_digits",
            r"\b(?:venmo|paypal|cash\s?app|zelle|bank|account|send\s+money\s+to)\b.{0,30}\d{4,}",
            Category::PaymentKeyword,
        ),
        ClassificationRule::block(
            "payment_digits_service",
            r"\d{4,}.{0,30}\b(?:venmo|paypal|cash\s?app|zelle|bank|account)\b",
            Category::PaymentKeyword,
        ),
        ClassificationRule::block(
            "payment_instruction",
            r"\b(?:send|transfer|pay|payment|deposit)\b.{0,20}\b(?:to|at|account|number)\b",
            Category::PaymentInstruction,
        ),
        ClassificationRule::block(
            "payment_email",
            r"\b[\w.-]+@(?:paypal|venmo|cash|bank|payment)\.[\w.-]+\b",
            Category::PaymentEmail,
        ),
        ClassificationRule::block(
            "payment_username",
            r"\b(?:venmo|cash\s?app|paypal|zelle)(?:\s+(?:is|at|me))?\s*[:@$]\s*@?[\w.-]{2,}",
            Category::PaymentUsername,
        ),
        ClassificationRule::block(
            "bypass_phrase",
            r"\b(?:pay\s+me\s+directly|offline\s+payments?|outside\s+(?:the|this)\s+app|avoid\s+(?:the\s+)?(?:platform\s+|service\s+|app\s+)?fees?|bypass\s+(?:the\s+)?platform|off[-\s]platform)\b",
            Category::BypassPhrase,
        ),
    ]
}
