//! Export boundary
//!
//! Projects the ledger into flat reporting rows and renders them as CSV.

pub mod csv;
pub mod rows;

pub use self::csv::write_csv;
pub use rows::{export_rows, DateInterval, ExportRow};
