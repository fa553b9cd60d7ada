//! Core data models for envelope-ledger
//!
//! Defines the entity types of the ledger: envelopes, transactions with
//! kind-specific envelope references, and the income allocations owned by
//! income transactions.

pub mod envelope;
pub mod icons;
pub mod ids;
pub mod money;
pub mod transaction;

pub use envelope::{Envelope, EnvelopeValidationError};
pub use icons::{DEFAULT_ICON, ENVELOPE_ICONS};
pub use ids::{EnvelopeId, TransactionId};
pub use money::{Money, MoneyParseError};
pub use transaction::{
    IncomeAllocation, Transaction, TransactionKind, TransactionValidationError,
};
