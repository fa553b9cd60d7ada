//! Balance engine
//!
//! Computes an envelope's current balance and its recent activity feed by
//! folding over the raw record set on every call. Nothing is cached, so a
//! read immediately after a write always reflects it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{EnvelopeId, Money, TransactionId};
use crate::storage::Storage;

/// Service for derived balances and per-envelope activity
pub struct BalanceService<'a> {
    storage: &'a Storage,
}

/// How a transaction touched the envelope being inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Expense,
    TransferOut,
    TransferIn,
    Income,
}

/// One entry in an envelope's recent-activity feed
#[derive(Debug, Clone)]
pub struct ActivityItem {
    /// Transaction behind this entry (an allocation reports its parent)
    pub transaction_id: TransactionId,
    pub kind: ActivityKind,
    /// Effective date: the transaction's own date, or for an allocation its
    /// parent transaction's date
    pub date: NaiveDate,
    /// Signed amount: credits positive, debits negative
    pub amount: Money,
    pub note: Option<String>,
    /// Counterparty annotation: the other envelope of a transfer, otherwise
    /// the inspected envelope itself
    pub envelope_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Current balance of an envelope.
    ///
    /// ```text
    /// balance = income allocations in
    ///         + transfers in
    ///         - expenses out
    ///         - transfers out
    /// ```
    ///
    /// Each of the four sub-queries is fail-open: if the store cannot be
    /// read, that source contributes zero rather than failing the whole
    /// computation. An envelope with no activity has balance zero.
    pub fn balance(&self, envelope_id: EnvelopeId) -> Money {
        let transactions = &self.storage.transactions;
        let mut total = Money::zero();

        for (_, allocation) in transactions.allocations_for(envelope_id).unwrap_or_default() {
            total += allocation.amount;
        }

        for txn in transactions.transfers_to(envelope_id).unwrap_or_default() {
            total += txn.amount;
        }

        for txn in transactions.expenses_for(envelope_id).unwrap_or_default() {
            total -= txn.amount;
        }

        for txn in transactions.transfers_from(envelope_id).unwrap_or_default() {
            total -= txn.amount;
        }

        total
    }

    /// The last `limit` entries affecting an envelope, most recent first.
    ///
    /// Gathers expenses, transfers in both directions, and income
    /// allocations independently, each already sorted and capped, then
    /// merges and truncates. Allocations are over-fetched at twice the
    /// limit because their effective date comes from the parent transaction;
    /// capping them at `limit` before the join could drop an entry that
    /// belongs in the final window. Equal dates order by recording time,
    /// then by transaction id.
    pub fn recent_activity(&self, envelope_id: EnvelopeId, limit: usize) -> Vec<ActivityItem> {
        let transactions = &self.storage.transactions;
        let own_name = self.envelope_name(envelope_id);
        let mut items: Vec<ActivityItem> = Vec::new();

        let mut expenses = transactions.expenses_for(envelope_id).unwrap_or_default();
        sort_recent_first(&mut expenses);
        for txn in expenses.into_iter().take(limit) {
            items.push(ActivityItem {
                transaction_id: txn.id,
                kind: ActivityKind::Expense,
                date: txn.date,
                amount: -txn.amount,
                note: txn.note,
                envelope_name: own_name.clone(),
                created_at: txn.created_at,
            });
        }

        let mut outgoing = transactions.transfers_from(envelope_id).unwrap_or_default();
        sort_recent_first(&mut outgoing);
        for txn in outgoing.into_iter().take(limit) {
            let target_name = match &txn.kind {
                crate::models::TransactionKind::Transfer { target_id, .. } => {
                    self.envelope_name(*target_id)
                }
                _ => None,
            };
            items.push(ActivityItem {
                transaction_id: txn.id,
                kind: ActivityKind::TransferOut,
                date: txn.date,
                amount: -txn.amount,
                note: txn.note,
                envelope_name: target_name,
                created_at: txn.created_at,
            });
        }

        let mut incoming = transactions.transfers_to(envelope_id).unwrap_or_default();
        sort_recent_first(&mut incoming);
        for txn in incoming.into_iter().take(limit) {
            let source_name = match &txn.kind {
                crate::models::TransactionKind::Transfer { source_id, .. } => {
                    self.envelope_name(*source_id)
                }
                _ => None,
            };
            items.push(ActivityItem {
                transaction_id: txn.id,
                kind: ActivityKind::TransferIn,
                date: txn.date,
                amount: txn.amount,
                note: txn.note,
                envelope_name: source_name,
                created_at: txn.created_at,
            });
        }

        // Allocation dates live on the parent, so sort the pairs by parent
        // date and over-fetch before the final merge
        let mut allocations = transactions.allocations_for(envelope_id).unwrap_or_default();
        allocations.sort_by(|(a, _), (b, _)| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        for (parent, allocation) in allocations.into_iter().take(limit * 2) {
            items.push(ActivityItem {
                transaction_id: parent.id,
                kind: ActivityKind::Income,
                date: parent.date,
                amount: allocation.amount,
                note: parent.note.clone(),
                envelope_name: own_name.clone(),
                created_at: parent.created_at,
            });
        }

        items.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.transaction_id.cmp(&b.transaction_id))
        });
        items.truncate(limit);
        items
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

fn sort_recent_first(transactions: &mut [crate::models::Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Envelope, IncomeAllocation, Transaction};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add_envelope(storage: &Storage, name: &str, order: i32) -> EnvelopeId {
        let envelope = Envelope::with_sort_order(name, "envelope", order);
        let id = envelope.id;
        storage.envelopes.upsert(envelope).unwrap();
        id
    }

    #[test]
    fn test_balance_of_untouched_envelope_is_zero() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);

        let service = BalanceService::new(&storage);
        assert_eq!(service.balance(groceries), Money::zero());
    }

    #[test]
    fn test_balance_folds_all_four_sources() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);
        let fun = add_envelope(&storage, "Fun", 1);

        // +100.00 income allocation
        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(10000),
                date(2025, 1, 1),
                None,
                vec![IncomeAllocation::new(groceries, Money::from_cents(10000))],
            ))
            .unwrap();
        // -30.00 expense
        storage
            .transactions
            .upsert(Transaction::expense(
                groceries,
                Money::from_cents(3000),
                date(2025, 1, 2),
                None,
            ))
            .unwrap();
        // -15.00 transfer out to Fun
        storage
            .transactions
            .upsert(Transaction::transfer(
                groceries,
                fun,
                Money::from_cents(1500),
                date(2025, 1, 3),
                None,
            ))
            .unwrap();
        // +5.00 transfer back in
        storage
            .transactions
            .upsert(Transaction::transfer(
                fun,
                groceries,
                Money::from_cents(500),
                date(2025, 1, 4),
                None,
            ))
            .unwrap();

        let service = BalanceService::new(&storage);
        assert_eq!(service.balance(groceries).cents(), 10000 - 3000 - 1500 + 500);
        assert_eq!(service.balance(fun).cents(), 1500 - 500);
    }

    #[test]
    fn test_balance_oracle_over_command_sequence() {
        // Balance must equal the closed-form sum recomputed independently
        // from the full record set
        let (_temp_dir, storage) = create_test_storage();
        let a = add_envelope(&storage, "A", 0);
        let b = add_envelope(&storage, "B", 1);

        let script: &[(i64, u32)] = &[(10000, 0), (2500, 1), (700, 2), (1200, 1), (4400, 3)];
        for (i, (cents, op)) in script.iter().enumerate() {
            let amount = Money::from_cents(*cents);
            let d = date(2025, 1, (i + 1) as u32);
            let txn = match op {
                0 => Transaction::income(
                    amount,
                    d,
                    None,
                    vec![IncomeAllocation::new(a, amount)],
                ),
                1 => Transaction::expense(a, amount, d, None),
                2 => Transaction::transfer(a, b, amount, d, None),
                _ => Transaction::transfer(b, a, amount, d, None),
            };
            storage.transactions.upsert(txn).unwrap();
        }

        // Oracle: walk the full record set once
        let mut expected = 0i64;
        for txn in storage.transactions.get_all().unwrap() {
            for alloc in txn.allocations() {
                if alloc.envelope_id == a {
                    expected += alloc.amount.cents();
                }
            }
            match txn.kind {
                crate::models::TransactionKind::Expense { envelope_id } if envelope_id == a => {
                    expected -= txn.amount.cents();
                }
                crate::models::TransactionKind::Transfer { source_id, .. } if source_id == a => {
                    expected -= txn.amount.cents();
                }
                crate::models::TransactionKind::Transfer { target_id, .. } if target_id == a => {
                    expected += txn.amount.cents();
                }
                _ => {}
            }
        }

        let service = BalanceService::new(&storage);
        assert_eq!(service.balance(a).cents(), expected);
    }

    #[test]
    fn test_negative_balance_is_allowed() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);

        storage
            .transactions
            .upsert(Transaction::expense(
                groceries,
                Money::from_cents(5000),
                date(2025, 1, 2),
                None,
            ))
            .unwrap();

        let service = BalanceService::new(&storage);
        assert_eq!(service.balance(groceries).cents(), -5000);
    }

    #[test]
    fn test_recent_activity_signs_and_names() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);
        let fun = add_envelope(&storage, "Fun", 1);

        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(10000),
                date(2025, 1, 1),
                Some("paycheck".into()),
                vec![IncomeAllocation::new(groceries, Money::from_cents(10000))],
            ))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(
                groceries,
                Money::from_cents(3000),
                date(2025, 1, 2),
                Some("weekly shop".into()),
            ))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::transfer(
                fun,
                groceries,
                Money::from_cents(1000),
                date(2025, 1, 3),
                None,
            ))
            .unwrap();

        let service = BalanceService::new(&storage);
        let items = service.recent_activity(groceries, 10);

        assert_eq!(items.len(), 3);
        // Most recent first
        assert_eq!(items[0].kind, ActivityKind::TransferIn);
        assert_eq!(items[0].amount.cents(), 1000);
        assert_eq!(items[0].envelope_name.as_deref(), Some("Fun"));

        assert_eq!(items[1].kind, ActivityKind::Expense);
        assert_eq!(items[1].amount.cents(), -3000);
        assert_eq!(items[1].note.as_deref(), Some("weekly shop"));

        assert_eq!(items[2].kind, ActivityKind::Income);
        assert_eq!(items[2].amount.cents(), 10000);
        assert_eq!(items[2].note.as_deref(), Some("paycheck"));

        // The same transfer shows inverted in the source envelope's feed
        let fun_items = service.recent_activity(fun, 10);
        assert_eq!(fun_items[0].kind, ActivityKind::TransferOut);
        assert_eq!(fun_items[0].amount.cents(), -1000);
        assert_eq!(fun_items[0].envelope_name.as_deref(), Some("Groceries"));
    }

    #[test]
    fn test_recent_activity_truncates_to_limit() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);

        for day in 1..=20 {
            storage
                .transactions
                .upsert(Transaction::expense(
                    groceries,
                    Money::from_cents(100 * day as i64),
                    date(2025, 1, day),
                    None,
                ))
                .unwrap();
        }

        let service = BalanceService::new(&storage);
        let items = service.recent_activity(groceries, 5);

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].date, date(2025, 1, 20));
        assert_eq!(items[4].date, date(2025, 1, 16));
    }

    #[test]
    fn test_old_allocation_not_squeezed_out_by_capping() {
        // An envelope with many expenses and one old allocation: the
        // allocation source is capped independently, so the allocation must
        // still appear once the expenses fall outside the window
        let (_temp_dir, storage) = create_test_storage();
        let groceries = add_envelope(&storage, "Groceries", 0);

        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(9000),
                date(2025, 1, 31),
                None,
                vec![IncomeAllocation::new(groceries, Money::from_cents(9000))],
            ))
            .unwrap();
        for day in 1..=10 {
            storage
                .transactions
                .upsert(Transaction::expense(
                    groceries,
                    Money::from_cents(100),
                    date(2025, 1, day),
                    None,
                ))
                .unwrap();
        }

        let service = BalanceService::new(&storage);
        let items = service.recent_activity(groceries, 3);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].kind, ActivityKind::Income);
        assert_eq!(items[0].date, date(2025, 1, 31));
    }
}
