//! Categories of sensitive content and rule severities.

use serde::{Deserialize, Serialize};

/// Kinds of sensitive content a rule can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Any run of digits.
    NumericSequence,
    /// Bank account numbers.
    BankAccount,
    /// Credit or debit card numbers.
    CreditCard,
    /// Phone numbers.
    PhoneNumber,
    /// A payment service named next to a long number.
    PaymentKeyword,
    /// Instructions to send money somewhere.
    PaymentInstruction,
    /// Email addresses at payment-related domains.
    PaymentEmail,
    /// Payment service handles (venmo, cashapp, ...).
    PaymentUsername,
    /// Explicit requests to pay outside the platform.
    BypassPhrase,
}

impl Category {
    /// Returns all available categories.
    pub fn all() -> &'static [Category] {
        &[
            Category::NumericSequence,
            Category::BankAccount,
            Category::CreditCard,
            Category::PhoneNumber,
            Category::PaymentKeyword,
            Category::PaymentInstruction,
            Category::PaymentEmail,
            Category::PaymentUsername,
            Category::BypassPhrase,
        ]
    }

    /// Returns a human-readable name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::NumericSequence => "Numeric Sequence",
            Category::BankAccount => "Bank Account",
            Category::CreditCard => "Credit Card",
            Category::PhoneNumber => "Phone Number",
            Category::PaymentKeyword => "Payment Keyword",
            Category::PaymentInstruction => "Payment Instruction",
            Category::PaymentEmail => "Payment Email",
            Category::PaymentUsername => "Payment Username",
            Category::BypassPhrase => "Bypass Phrase",
        }
    }

    /// Returns the stable snake_case identifier used in config and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NumericSequence => "numeric_sequence",
            Category::BankAccount => "bank_account",
            Category::CreditCard => "credit_card",
            Category::PhoneNumber => "phone_number",
            Category::PaymentKeyword => "payment_keyword",
            Category::PaymentInstruction => "payment_instruction",
            Category::PaymentEmail => "payment_email",
            Category::PaymentUsername => "payment_username",
            Category::BypassPhrase => "bypass_phrase",
        }
    }

    /// Noun phrase used in user-facing messages, including the article.
    pub fn description(&self) -> &'static str {
        match self {
            Category::NumericSequence => "a number",
            Category::BankAccount => "a potential account number",
            Category::CreditCard => "a potential credit card number",
            Category::PhoneNumber => "a phone number",
            Category::PaymentKeyword => "a payment service reference",
            Category::PaymentInstruction => "a payment instruction",
            Category::PaymentEmail => "a payment service email",
            Category::PaymentUsername => "a payment service username",
            Category::BypassPhrase => "an attempt to bypass the platform",
        }
    }

    /// Message shown to the user when this category blocks their text.
    pub fn message(&self) -> String {
        format!(
            "Your message contains {}, which is not allowed. Please remove it to continue.",
            self.description()
        )
    }

    /// Whether matches of this category are literal secrets that masking replaces.
    ///
    /// Keyword and phrase categories only signal intent and are left in place.
    pub fn is_maskable(&self) -> bool {
        matches!(
            self,
            Category::NumericSequence
                | Category::BankAccount
                | Category::CreditCard
                | Category::PhoneNumber
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a match of a rule does to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reject the text.
    #[default]
    Block,
    /// Report the match but accept the text.
    Warn,
}

impl Severity {
    /// Returns a human-readable name for this severity.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Block => "Block",
            Severity::Warn => "Warn",
        }
    }
}
