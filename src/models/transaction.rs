//! Transaction model
//!
//! Every ledger entry is a transaction with one of three kinds: an expense
//! debiting one envelope, a transfer between two envelopes, or an income
//! that owns the allocations crediting envelopes. The kind determines which
//! envelope references exist, so the variants carry them directly instead of
//! a row of nullable fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EnvelopeId, TransactionId};
use super::money::Money;

/// A credit of part of an income transaction into one envelope.
///
/// Allocations exist only inside their parent income transaction and are
/// persisted with it as a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeAllocation {
    /// The envelope receiving this slice of the income
    pub envelope_id: EnvelopeId,

    /// Amount credited (positive)
    pub amount: Money,
}

impl IncomeAllocation {
    /// Create a new allocation
    pub fn new(envelope_id: EnvelopeId, amount: Money) -> Self {
        Self {
            envelope_id,
            amount,
        }
    }
}

/// Kind-specific data for a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    /// A debit from exactly one envelope
    Expense {
        /// The envelope we spend from
        envelope_id: EnvelopeId,
    },
    /// A debit from the source envelope and matching credit to the target
    Transfer {
        source_id: EnvelopeId,
        target_id: EnvelopeId,
    },
    /// A deposit split into one or more envelope allocations
    Income { allocations: Vec<IncomeAllocation> },
}

impl TransactionKind {
    /// Short tag for display and export ("expense", "transfer", "income")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Expense { .. } => "expense",
            Self::Transfer { .. } => "transfer",
            Self::Income { .. } => "income",
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Amount, always stored positive; the kind determines the sign of its
    /// effect on each envelope
    pub amount: Money,

    /// Transaction date
    pub date: NaiveDate,

    /// Optional free-text note
    pub note: Option<String>,

    /// Kind tag plus the envelope references that kind carries
    #[serde(flatten)]
    pub kind: TransactionKind,

    /// When the transaction was recorded (sub-day ordering key)
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create an expense debiting one envelope
    pub fn expense(
        envelope_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            date,
            note,
            kind: TransactionKind::Expense { envelope_id },
            created_at: Utc::now(),
        }
    }

    /// Create a transfer between two envelopes
    pub fn transfer(
        source_id: EnvelopeId,
        target_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            date,
            note,
            kind: TransactionKind::Transfer {
                source_id,
                target_id,
            },
            created_at: Utc::now(),
        }
    }

    /// Create an income transaction owning the given allocations
    pub fn income(
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
        allocations: Vec<IncomeAllocation>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            amount,
            date,
            note,
            kind: TransactionKind::Income { allocations },
            created_at: Utc::now(),
        }
    }

    /// Check if this is an income transaction
    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income { .. })
    }

    /// Check if this is an expense
    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    /// Check if this is a transfer
    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, TransactionKind::Transfer { .. })
    }

    /// The allocations of an income transaction, empty for other kinds
    pub fn allocations(&self) -> &[IncomeAllocation] {
        match &self.kind {
            TransactionKind::Income { allocations } => allocations,
            _ => &[],
        }
    }

    /// Total of all allocations (should equal the amount for income)
    pub fn allocations_total(&self) -> Money {
        self.allocations().iter().map(|a| a.amount).sum()
    }

    /// True if this transaction references the envelope in any role
    /// (expense debit, transfer source/target, or allocation target)
    pub fn references_envelope(&self, id: EnvelopeId) -> bool {
        match &self.kind {
            TransactionKind::Expense { envelope_id } => *envelope_id == id,
            TransactionKind::Transfer {
                source_id,
                target_id,
            } => *source_id == id || *target_id == id,
            TransactionKind::Income { allocations } => {
                allocations.iter().any(|a| a.envelope_id == id)
            }
        }
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        match &self.kind {
            TransactionKind::Expense { .. } => Ok(()),
            TransactionKind::Transfer {
                source_id,
                target_id,
            } => {
                if source_id == target_id {
                    return Err(TransactionValidationError::TransferToSelf);
                }
                Ok(())
            }
            TransactionKind::Income { allocations } => {
                if allocations.is_empty() {
                    return Err(TransactionValidationError::NoAllocations);
                }
                if allocations.iter().any(|a| !a.amount.is_positive()) {
                    return Err(TransactionValidationError::NonPositiveAllocation);
                }
                let total = self.allocations_total();
                if total != self.amount {
                    return Err(TransactionValidationError::AllocationsMismatch {
                        transaction_amount: self.amount,
                        allocations_total: total,
                    });
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind.label(),
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    TransferToSelf,
    NoAllocations,
    NonPositiveAllocation,
    AllocationsMismatch {
        transaction_amount: Money,
        allocations_total: Money,
    },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be positive (got {})", amount)
            }
            Self::TransferToSelf => {
                write!(f, "Transfer source and target must be different envelopes")
            }
            Self::NoAllocations => {
                write!(f, "Income transaction must have at least one allocation")
            }
            Self::NonPositiveAllocation => {
                write!(f, "Income allocations must be positive")
            }
            Self::AllocationsMismatch {
                transaction_amount,
                allocations_total,
            } => write!(
                f,
                "Allocation totals ({}) do not match income amount ({})",
                allocations_total, transaction_amount
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
