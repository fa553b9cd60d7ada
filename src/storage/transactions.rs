//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json. Secondary
//! indexes track which transactions touch an envelope in each role (expense
//! debit, transfer source, transfer target, allocation target) so balance
//! and activity queries don't scan the whole store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{EnvelopeId, IncomeAllocation, Transaction, TransactionId, TransactionKind};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Which role an envelope plays in a transaction, used as index key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RefKind {
    ExpenseEnvelope,
    TransferSource,
    TransferTarget,
    AllocationEnvelope,
}

/// Repository for transaction persistence with per-role envelope indexes
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: (envelope_id, role) -> transaction_ids
    by_envelope: RwLock<HashMap<(EnvelopeId, RefKind), Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_envelope: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_envelope = self
            .by_envelope
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_envelope.clear();

        for txn in file_data.transactions {
            Self::index_transaction(&mut by_envelope, &txn);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        let file_data = TransactionData { transactions };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions, most recent first
    pub fn get_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transactions)
    }

    /// Expenses debiting the given envelope
    pub fn expenses_for(&self, envelope_id: EnvelopeId) -> Result<Vec<Transaction>, LedgerError> {
        self.get_indexed(envelope_id, RefKind::ExpenseEnvelope)
    }

    /// Transfers out of the given envelope
    pub fn transfers_from(&self, envelope_id: EnvelopeId) -> Result<Vec<Transaction>, LedgerError> {
        self.get_indexed(envelope_id, RefKind::TransferSource)
    }

    /// Transfers into the given envelope
    pub fn transfers_to(&self, envelope_id: EnvelopeId) -> Result<Vec<Transaction>, LedgerError> {
        self.get_indexed(envelope_id, RefKind::TransferTarget)
    }

    /// Income allocations into the given envelope, paired with their parent
    /// transaction (the parent carries the date and note)
    pub fn allocations_for(
        &self,
        envelope_id: EnvelopeId,
    ) -> Result<Vec<(Transaction, IncomeAllocation)>, LedgerError> {
        let parents = self.get_indexed(envelope_id, RefKind::AllocationEnvelope)?;

        Ok(parents
            .into_iter()
            .flat_map(|txn| {
                let matching: Vec<_> = txn
                    .allocations()
                    .iter()
                    .filter(|a| a.envelope_id == envelope_id)
                    .cloned()
                    .collect();
                matching.into_iter().map(move |a| (txn.clone(), a))
            })
            .collect())
    }

    /// All income allocations across the store, paired with their parent
    pub fn all_allocations(&self) -> Result<Vec<(Transaction, IncomeAllocation)>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|t| t.is_income())
            .flat_map(|txn| {
                txn.allocations()
                    .iter()
                    .cloned()
                    .map(move |a| (txn.clone(), a))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    /// All expense and transfer transactions, unsorted
    pub fn expenses_and_transfers(&self) -> Result<Vec<Transaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|t| !t.is_income())
            .cloned()
            .collect())
    }

    /// Count of expense/transfer transactions referencing the envelope.
    ///
    /// Income allocations are not counted here; they cascade on envelope
    /// deletion instead of blocking it.
    pub fn spending_references(&self, envelope_id: EnvelopeId) -> Result<usize, LedgerError> {
        let by_envelope = self
            .by_envelope
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let count = [
            RefKind::ExpenseEnvelope,
            RefKind::TransferSource,
            RefKind::TransferTarget,
        ]
        .iter()
        .map(|kind| {
            by_envelope
                .get(&(envelope_id, *kind))
                .map(Vec::len)
                .unwrap_or(0)
        })
        .sum();

        Ok(count)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_envelope = self
            .by_envelope
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        // Remove from old indexes if updating
        if let Some(old) = data.get(&txn.id) {
            Self::unindex_transaction(&mut by_envelope, old);
        }

        Self::index_transaction(&mut by_envelope, &txn);
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_envelope = self
            .by_envelope
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(txn) = data.remove(&id) {
            Self::unindex_transaction(&mut by_envelope, &txn);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }

    fn get_indexed(
        &self,
        envelope_id: EnvelopeId,
        kind: RefKind,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_envelope = self
            .by_envelope
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let ids = by_envelope
            .get(&(envelope_id, kind))
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        Ok(ids.iter().filter_map(|id| data.get(id).cloned()).collect())
    }

    fn index_transaction(
        by_envelope: &mut HashMap<(EnvelopeId, RefKind), Vec<TransactionId>>,
        txn: &Transaction,
    ) {
        for (envelope_id, kind) in Self::index_keys(txn) {
            by_envelope.entry((envelope_id, kind)).or_default().push(txn.id);
        }
    }

    fn unindex_transaction(
        by_envelope: &mut HashMap<(EnvelopeId, RefKind), Vec<TransactionId>>,
        txn: &Transaction,
    ) {
        for (envelope_id, kind) in Self::index_keys(txn) {
            if let Some(ids) = by_envelope.get_mut(&(envelope_id, kind)) {
                ids.retain(|&id| id != txn.id);
            }
        }
    }

    fn index_keys(txn: &Transaction) -> Vec<(EnvelopeId, RefKind)> {
        match &txn.kind {
            TransactionKind::Expense { envelope_id } => {
                vec![(*envelope_id, RefKind::ExpenseEnvelope)]
            }
            TransactionKind::Transfer {
                source_id,
                target_id,
            } => vec![
                (*source_id, RefKind::TransferSource),
                (*target_id, RefKind::TransferTarget),
            ],
            TransactionKind::Income { allocations } => {
                let mut keys: Vec<_> = allocations
                    .iter()
                    .map(|a| (a.envelope_id, RefKind::AllocationEnvelope))
                    .collect();
                // An income transaction indexes once per envelope even if it
                // somehow carries two allocations to the same one
                keys.sort_by_key(|(id, _)| *id);
                keys.dedup();
                keys
            }
        }
    }
}
