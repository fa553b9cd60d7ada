//! Transaction service
//!
//! Commands for recording expenses, transfers, and income. Every command
//! validates before any write and commits as one unit of work. Balances are
//! deliberately not checked at write time: an envelope may go negative, and
//! overspend is a display concern, never a rejected transaction.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{EnvelopeId, IncomeAllocation, Money, Transaction};
use crate::storage::Storage;

/// Service for recording ledger transactions
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an expense debiting one envelope
    pub fn record_expense(
        &self,
        envelope_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> LedgerResult<Transaction> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "Expense amount must be positive".into(),
            ));
        }
        self.require_envelope(envelope_id)?;

        let txn = Transaction::expense(envelope_id, amount, date, note);
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        Ok(txn)
    }

    /// Record a transfer between two distinct envelopes
    pub fn record_transfer(
        &self,
        source_id: EnvelopeId,
        target_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> LedgerResult<Transaction> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "Transfer amount must be positive".into(),
            ));
        }
        if source_id == target_id {
            return Err(LedgerError::Validation(
                "Cannot transfer to the same envelope".into(),
            ));
        }
        self.require_envelope(source_id)?;
        self.require_envelope(target_id)?;

        let txn = Transaction::transfer(source_id, target_id, amount, date, note);
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        Ok(txn)
    }

    /// Record an income transaction with its allocations.
    ///
    /// Zero-amount entries are dropped; the remaining entries must reference
    /// existing envelopes and sum to the income amount exactly. The
    /// transaction and its allocations are persisted as one unit.
    pub fn record_income(
        &self,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
        allocations: Vec<(EnvelopeId, Money)>,
    ) -> LedgerResult<Transaction> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "Income amount must be positive".into(),
            ));
        }

        let entries: Vec<IncomeAllocation> = allocations
            .into_iter()
            .filter(|(_, m)| !m.is_zero())
            .map(|(envelope_id, m)| IncomeAllocation::new(envelope_id, m))
            .collect();

        if entries.is_empty() {
            return Err(LedgerError::Validation(
                "Income must be allocated to at least one envelope".into(),
            ));
        }
        if entries.iter().any(|a| a.amount.is_negative()) {
            return Err(LedgerError::Validation(
                "Income allocations must be positive".into(),
            ));
        }

        let allocated: Money = entries.iter().map(|a| a.amount).sum();
        if allocated != amount {
            return Err(LedgerError::AllocationMismatch {
                expected: amount.to_string(),
                allocated: allocated.to_string(),
            });
        }

        for entry in &entries {
            self.require_envelope(entry.envelope_id)?;
        }

        let txn = Transaction::income(amount, date, note, entries);
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        Ok(txn)
    }

    /// Single-envelope income shortcut: the full amount becomes one
    /// allocation to the given envelope
    pub fn record_income_single(
        &self,
        envelope_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> LedgerResult<Transaction> {
        self.record_income(amount, date, note, vec![(envelope_id, amount)])
    }

    fn require_envelope(&self, id: EnvelopeId) -> LedgerResult<()> {
        if self.storage.envelopes.get(id)?.is_none() {
            return Err(LedgerError::envelope_not_found(id.to_string()));
        }
        Ok(())
    }
}
