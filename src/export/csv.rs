//! CSV export functionality
//!
//! Renders the flat-row export projection as CSV with the header
//! `date,envelope,type,amount,note`.

use std::io::Write;

use crate::error::LedgerResult;
use crate::models::Money;

use super::rows::{export_error, ExportRow};

/// Write export rows as CSV
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> LedgerResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["date", "envelope", "type", "amount", "note"])
        .map_err(export_error)?;

    for row in rows {
        csv_writer
            .write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.envelope.clone(),
                row.kind.to_string(),
                amount_field(row.amount),
                row.note.clone().unwrap_or_default(),
            ])
            .map_err(export_error)?;
    }

    csv_writer.flush().map_err(export_error)?;
    Ok(())
}

/// Plain signed decimal without a currency symbol, e.g. "-30.00"
fn amount_field(amount: Money) -> String {
    if amount.is_negative() {
        format!("-{}.{:02}", amount.dollars().abs(), amount.cents_part())
    } else {
        format!("{}.{:02}", amount.dollars(), amount.cents_part())
    }
}
