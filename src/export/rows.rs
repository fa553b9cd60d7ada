//! Flat-row export projection
//!
//! Projects the ledger into `{date, envelope, type, amount, note}` rows for
//! reporting: one row per income allocation (positive) and one per expense
//! or transfer (negative), ordered ascending by date, optionally bounded to
//! a date interval.

use chrono::{Datelike, NaiveDate};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, TransactionKind};
use crate::storage::Storage;

/// One row of the export projection
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub date: NaiveDate,
    /// Associated envelope name: the allocation target for income, the
    /// debited envelope for an expense, the source for a transfer
    pub envelope: String,
    /// Kind tag: "income", "expense", or "transfer"
    pub kind: &'static str,
    /// Signed amount: income positive, expense/transfer negative
    pub amount: Money,
    pub note: Option<String>,
}

/// Inclusive date interval bounding an export
#[derive(Debug, Clone, Copy)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    /// From the first of `today`'s month through `today`
    pub fn current_month(today: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .unwrap_or(today);
        Self { start, end: today }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Build export rows from the full record set, ascending by date
pub fn export_rows(
    storage: &Storage,
    interval: Option<DateInterval>,
) -> LedgerResult<Vec<ExportRow>> {
    let mut rows: Vec<(ExportRow, chrono::DateTime<chrono::Utc>)> = Vec::new();

    let envelope_name = |id| -> String {
        storage
            .envelopes
            .get(id)
            .ok()
            .flatten()
            .map(|e| e.name)
            .unwrap_or_default()
    };

    for (parent, allocation) in storage.transactions.all_allocations()? {
        if let Some(interval) = interval {
            if !interval.contains(parent.date) {
                continue;
            }
        }
        rows.push((
            ExportRow {
                date: parent.date,
                envelope: envelope_name(allocation.envelope_id),
                kind: "income",
                amount: allocation.amount,
                note: parent.note.clone(),
            },
            parent.created_at,
        ));
    }

    for txn in storage.transactions.expenses_and_transfers()? {
        if let Some(interval) = interval {
            if !interval.contains(txn.date) {
                continue;
            }
        }
        let envelope = match &txn.kind {
            TransactionKind::Expense { envelope_id } => envelope_name(*envelope_id),
            TransactionKind::Transfer { source_id, .. } => envelope_name(*source_id),
            TransactionKind::Income { .. } => continue,
        };
        rows.push((
            ExportRow {
                date: txn.date,
                envelope,
                kind: txn.kind.label(),
                amount: -txn.amount,
                note: txn.note.clone(),
            },
            txn.created_at,
        ));
    }

    rows.sort_by(|(a, a_created), (b, b_created)| {
        a.date.cmp(&b.date).then(a_created.cmp(b_created))
    });

    Ok(rows.into_iter().map(|(row, _)| row).collect())
}

/// Map any error into the export taxonomy
pub fn export_error(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(err.to_string())
}
