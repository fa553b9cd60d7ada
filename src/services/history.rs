//! History aggregator
//!
//! Merges expense, transfer, and income-allocation records from across all
//! envelopes into one chronologically ordered, filterable, searchable feed.
//! Stateless: every call is a pure function of the store's current contents
//! and the three inputs.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::models::{EnvelopeId, Money, Transaction, TransactionId, TransactionKind};
use crate::storage::Storage;

/// Which slice of the history to show.
///
/// `Expenses` groups expenses and transfers together, mirroring the
/// "Expenses vs. Income" split of the history screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Income,
    Expenses,
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Income => write!(f, "Income"),
            Self::Expenses => write!(f, "Expenses"),
        }
    }
}

/// Discriminant of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Expense,
    Transfer,
    Income,
}

/// One read-only row of the unified history feed
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub kind: HistoryKind,
    pub date: NaiveDate,
    /// Signed amount: income positive, expense and transfer-out negative
    pub amount: Money,
    pub note: Option<String>,
    /// Associated envelope name, best effort: the debited envelope for an
    /// expense, the source for a transfer, the allocation target for income
    pub envelope_name: Option<String>,
    /// Display label ("Expense", "Transfer to X", "Income")
    pub detail: String,
    created_at: DateTime<Utc>,
    transaction_id: TransactionId,
}

/// Service producing the unified history feed
pub struct HistoryService<'a> {
    storage: &'a Storage,
}

impl<'a> HistoryService<'a> {
    /// Create a new history service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All history entries matching the filter, optional envelope, and
    /// search text, most recent first.
    ///
    /// Search is a case-insensitive substring match against the entry's
    /// envelope names and note; empty search text matches everything.
    /// Read failures contribute an empty source rather than an error.
    pub fn history_items(
        &self,
        filter: HistoryFilter,
        envelope_id: Option<EnvelopeId>,
        search_text: &str,
    ) -> Vec<HistoryItem> {
        let mut items: Vec<HistoryItem> = Vec::new();
        let search = search_text.trim().to_lowercase();

        if filter != HistoryFilter::Expenses {
            let allocations = match envelope_id {
                Some(id) => self.storage.transactions.allocations_for(id),
                None => self.storage.transactions.all_allocations(),
            }
            .unwrap_or_default();

            for (parent, allocation) in allocations {
                let envelope_name = self.envelope_name(allocation.envelope_id);
                if matches(&search, [envelope_name.as_deref(), parent.note.as_deref()]) {
                    items.push(HistoryItem {
                        kind: HistoryKind::Income,
                        date: parent.date,
                        amount: allocation.amount,
                        note: parent.note.clone(),
                        envelope_name,
                        detail: "Income".to_string(),
                        created_at: parent.created_at,
                        transaction_id: parent.id,
                    });
                }
            }
        }

        if filter != HistoryFilter::Income {
            let transactions = self
                .storage
                .transactions
                .expenses_and_transfers()
                .unwrap_or_default();

            for txn in transactions {
                if let Some(id) = envelope_id {
                    if !txn.references_envelope(id) {
                        continue;
                    }
                }
                if let Some(item) = self.spending_item(&txn, &search) {
                    items.push(item);
                }
            }
        }

        items.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.transaction_id.cmp(&b.transaction_id))
        });
        items
    }

    /// Build the history item for an expense or transfer, applying the
    /// search predicate
    fn spending_item(&self, txn: &Transaction, search: &str) -> Option<HistoryItem> {
        match &txn.kind {
            TransactionKind::Expense { envelope_id } => {
                let envelope_name = self.envelope_name(*envelope_id);
                if !matches(search, [envelope_name.as_deref(), txn.note.as_deref()]) {
                    return None;
                }
                Some(HistoryItem {
                    kind: HistoryKind::Expense,
                    date: txn.date,
                    amount: -txn.amount,
                    note: txn.note.clone(),
                    envelope_name,
                    detail: "Expense".to_string(),
                    created_at: txn.created_at,
                    transaction_id: txn.id,
                })
            }
            TransactionKind::Transfer {
                source_id,
                target_id,
            } => {
                let source_name = self.envelope_name(*source_id);
                let target_name = self.envelope_name(*target_id);
                if !matches(
                    search,
                    [
                        source_name.as_deref(),
                        target_name.as_deref(),
                        txn.note.as_deref(),
                    ],
                ) {
                    return None;
                }
                let detail = format!(
                    "Transfer to {}",
                    target_name.as_deref().unwrap_or("envelope")
                );
                Some(HistoryItem {
                    kind: HistoryKind::Transfer,
                    date: txn.date,
                    amount: -txn.amount,
                    note: txn.note.clone(),
                    envelope_name: source_name,
                    detail,
                    created_at: txn.created_at,
                    transaction_id: txn.id,
                })
            }
            TransactionKind::Income { .. } => None,
        }
    }

    /// Envelope name lookup, fail-open to None
    fn envelope_name(&self, envelope_id: EnvelopeId) -> Option<String> {
        self.storage
            .envelopes
            .get(envelope_id)
            .ok()
            .flatten()
            .map(|e| e.name)
    }
}

/// Case-insensitive substring match against any of the candidate fields.
/// An empty needle matches everything.
fn matches<'f>(needle: &str, haystacks: impl IntoIterator<Item = Option<&'f str>>) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystacks
        .into_iter()
        .flatten()
        .any(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Envelope, IncomeAllocation};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn seeded_storage() -> (TempDir, Storage, EnvelopeId, EnvelopeId) {
        let (temp_dir, storage) = create_test_storage();

        let groceries = Envelope::with_sort_order("Groceries", "cart", 0);
        let fun = Envelope::with_sort_order("Fun", "gift", 1);
        let groceries_id = groceries.id;
        let fun_id = fun.id;
        storage.envelopes.upsert(groceries).unwrap();
        storage.envelopes.upsert(fun).unwrap();

        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(10000),
                date(1),
                Some("January paycheck".into()),
                vec![
                    IncomeAllocation::new(groceries_id, Money::from_cents(6000)),
                    IncomeAllocation::new(fun_id, Money::from_cents(4000)),
                ],
            ))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(
                groceries_id,
                Money::from_cents(3000),
                date(2),
                Some("weekly shop".into()),
            ))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::transfer(
                fun_id,
                groceries_id,
                Money::from_cents(1000),
                date(3),
                None,
            ))
            .unwrap();

        (temp_dir, storage, groceries_id, fun_id)
    }

    #[test]
    fn test_all_filter_returns_union() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        let items = service.history_items(HistoryFilter::All, None, "");

        // 2 allocations + 1 expense + 1 transfer, no duplicates or omissions
        assert_eq!(items.len(), 4);

        // Date-descending
        let dates: Vec<_> = items.iter().map(|i| i.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_income_filter_excludes_spending() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        let items = service.history_items(HistoryFilter::Income, None, "");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind == HistoryKind::Income));
        assert!(items.iter().all(|i| i.amount.is_positive()));
    }

    #[test]
    fn test_expenses_filter_includes_transfers() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        let items = service.history_items(HistoryFilter::Expenses, None, "");
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .any(|i| i.kind == HistoryKind::Transfer && i.amount.cents() == -1000));
        assert!(items
            .iter()
            .any(|i| i.kind == HistoryKind::Expense && i.amount.cents() == -3000));
    }

    #[test]
    fn test_envelope_constraint_covers_all_roles() {
        let (_temp_dir, storage, groceries_id, fun_id) = seeded_storage();
        let service = HistoryService::new(&storage);

        // Groceries: its allocation, its expense, and the transfer into it
        let groceries_items = service.history_items(HistoryFilter::All, Some(groceries_id), "");
        assert_eq!(groceries_items.len(), 3);

        // Fun: its allocation and the transfer out of it
        let fun_items = service.history_items(HistoryFilter::All, Some(fun_id), "");
        assert_eq!(fun_items.len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        // Matches the envelope name on the expense and the allocation,
        // plus the transfer whose target is Groceries
        let items = service.history_items(HistoryFilter::All, None, "gRoCeR");
        assert_eq!(items.len(), 3);

        // Matches the income note only
        let items = service.history_items(HistoryFilter::All, None, "paycheck");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind == HistoryKind::Income));
    }

    #[test]
    fn test_search_no_match_returns_empty() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        let items = service.history_items(HistoryFilter::All, None, "zz-no-match");
        assert!(items.is_empty());
    }

    #[test]
    fn test_transfer_detail_names_target() {
        let (_temp_dir, storage, _, _) = seeded_storage();
        let service = HistoryService::new(&storage);

        let items = service.history_items(HistoryFilter::Expenses, None, "");
        let transfer = items
            .iter()
            .find(|i| i.kind == HistoryKind::Transfer)
            .unwrap();

        assert_eq!(transfer.detail, "Transfer to Groceries");
        // Associated envelope of a transfer is the source
        assert_eq!(transfer.envelope_name.as_deref(), Some("Fun"));
    }

    #[test]
    fn test_empty_store_empty_feed() {
        let (_temp_dir, storage) = create_test_storage();
        let service = HistoryService::new(&storage);
        assert!(service
            .history_items(HistoryFilter::All, None, "")
            .is_empty());
    }
}
