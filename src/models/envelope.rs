//! Envelope model
//!
//! An envelope is a named bucket of money. Income is allocated into
//! envelopes and spending draws from them; the balance is always derived
//! from the transaction set, never stored on the envelope itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::icons::DEFAULT_ICON;
use super::ids::EnvelopeId;
use super::money::Money;

/// A named budget envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique identifier
    pub id: EnvelopeId,

    /// Envelope name
    pub name: String,

    /// Icon reference for display
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Sort order for manual ordering. Values need not be contiguous;
    /// sorting ascending must give a consistent total order.
    pub sort_order: i32,

    /// Optional target amount, used for progress display
    pub target_amount: Option<Money>,

    /// When the envelope was created
    pub created_at: DateTime<Utc>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Envelope {
    /// Create a new envelope
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: EnvelopeId::new(),
            name: name.into(),
            icon: icon.into(),
            sort_order: 0,
            target_amount: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new envelope with a specific sort order
    pub fn with_sort_order(
        name: impl Into<String>,
        icon: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        let mut envelope = Self::new(name, icon);
        envelope.sort_order = sort_order;
        envelope
    }

    /// Set a target amount
    pub fn set_target(&mut self, amount: Money) {
        self.target_amount = Some(amount);
    }

    /// Clear the target
    pub fn clear_target(&mut self) {
        self.target_amount = None;
    }

    /// Progress of `balance` against the target, clamped to 0.0..=1.0.
    /// Envelopes without a positive target always report full progress.
    pub fn progress(&self, balance: Money) -> f64 {
        match self.target_amount {
            Some(target) if target.is_positive() => {
                let ratio = balance.cents() as f64 / target.cents() as f64;
                ratio.clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Validate the envelope
    pub fn validate(&self) -> Result<(), EnvelopeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EnvelopeValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(EnvelopeValidationError::NameTooLong(self.name.len()));
        }

        if let Some(target) = self.target_amount {
            if target.is_negative() {
                return Err(EnvelopeValidationError::NegativeTarget);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for envelopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeTarget,
}

impl fmt::Display for EnvelopeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Envelope name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Envelope name too long ({} chars, max 50)", len)
            }
            Self::NegativeTarget => write!(f, "Target amount cannot be negative"),
        }
    }
}

impl std::error::Error for EnvelopeValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope() {
        let envelope = Envelope::new("Groceries", "cart");
        assert_eq!(envelope.name, "Groceries");
        assert_eq!(envelope.icon, "cart");
        assert_eq!(envelope.sort_order, 0);
        assert!(envelope.target_amount.is_none());
    }

    #[test]
    fn test_envelope_target() {
        let mut envelope = Envelope::new("Emergency Fund", "star");

        envelope.set_target(Money::from_cents(100_000)); // $1000.00
        assert_eq!(envelope.target_amount, Some(Money::from_cents(100_000)));

        envelope.clear_target();
        assert!(envelope.target_amount.is_none());
    }

    #[test]
    fn test_progress() {
        let mut envelope = Envelope::new("Vacation", "star");

        // No target: always full
        assert_eq!(envelope.progress(Money::from_cents(0)), 1.0);

        envelope.set_target(Money::from_cents(10_000));
        assert_eq!(envelope.progress(Money::from_cents(5000)), 0.5);
        assert_eq!(envelope.progress(Money::from_cents(20_000)), 1.0);
        assert_eq!(envelope.progress(Money::from_cents(-500)), 0.0);
    }

    #[test]
    fn test_validation() {
        let mut envelope = Envelope::new("Valid", DEFAULT_ICON);
        assert!(envelope.validate().is_ok());

        envelope.name = String::new();
        assert_eq!(envelope.validate(), Err(EnvelopeValidationError::EmptyName));

        envelope.name = "a".repeat(51);
        assert!(matches!(
            envelope.validate(),
            Err(EnvelopeValidationError::NameTooLong(_))
        ));

        envelope.name = "Valid".to_string();
        envelope.target_amount = Some(Money::from_cents(-100));
        assert_eq!(
            envelope.validate(),
            Err(EnvelopeValidationError::NegativeTarget)
        );
    }

    #[test]
    fn test_serialization() {
        let envelope = Envelope::with_sort_order("Fun", "gift", 3);
        let json = serde_json::to_string(&envelope).unwrap();
        let deserialized: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope.id, deserialized.id);
        assert_eq!(envelope.name, deserialized.name);
        assert_eq!(envelope.sort_order, deserialized.sort_order);
    }
}
