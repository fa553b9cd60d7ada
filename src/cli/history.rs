//! History CLI command

use clap::{Args, ValueEnum};

use crate::display::format_history;
use crate::error::LedgerResult;
use crate::services::{EnvelopeService, HistoryFilter, HistoryService};
use crate::storage::Storage;

use super::envelope::find_envelope;

/// CLI value for the history filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HistoryFilterArg {
    #[default]
    All,
    Income,
    /// Expenses and transfers
    Expenses,
}

impl From<HistoryFilterArg> for HistoryFilter {
    fn from(arg: HistoryFilterArg) -> Self {
        match arg {
            HistoryFilterArg::All => Self::All,
            HistoryFilterArg::Income => Self::Income,
            HistoryFilterArg::Expenses => Self::Expenses,
        }
    }
}

/// Arguments for the history feed
#[derive(Args)]
pub struct HistoryArgs {
    /// Which entries to show
    #[arg(short, long, value_enum, default_value = "all")]
    pub filter: HistoryFilterArg,

    /// Restrict to one envelope (name or ID)
    #[arg(short, long)]
    pub envelope: Option<String>,

    /// Case-insensitive search over envelope names and notes
    #[arg(short, long, default_value = "")]
    pub search: String,
}

/// Handle the `history` command
pub fn handle_history_command(storage: &Storage, args: HistoryArgs) -> LedgerResult<()> {
    let envelope_id = match &args.envelope {
        Some(identifier) => {
            let envelope_service = EnvelopeService::new(storage);
            Some(find_envelope(&envelope_service, identifier)?.id)
        }
        None => None,
    };

    let service = HistoryService::new(storage);
    let items = service.history_items(args.filter.into(), envelope_id, &args.search);
    print!("{}", format_history(&items));

    Ok(())
}
