//! Export CLI command

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_rows, write_csv, DateInterval};
use crate::storage::Storage;

use super::transaction::parse_date;

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only export the current month
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: bool,

    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

/// Handle the `export` command
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> LedgerResult<()> {
    let interval = if args.month {
        Some(DateInterval::current_month(Local::now().date_naive()))
    } else if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let start = parse_date(Some(from))?;
        let end = parse_date(Some(to))?;
        if start > end {
            return Err(LedgerError::Validation(
                "Export start date is after the end date".into(),
            ));
        }
        Some(DateInterval { start, end })
    } else {
        None
    };

    let rows = export_rows(storage, interval)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| LedgerError::Export(format!("Failed to create {}: {}", path.display(), e)))?;
            write_csv(&rows, BufWriter::new(file))?;
            eprintln!("Exported {} rows to {}", rows.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_csv(&rows, stdout.lock())?;
        }
    }

    Ok(())
}
