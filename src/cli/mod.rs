//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod envelope;
pub mod export;
pub mod history;
pub mod income;
pub mod transaction;

pub use envelope::{handle_envelope_command, EnvelopeCommands};
pub use export::{handle_export_command, ExportArgs};
pub use history::{handle_history_command, HistoryArgs};
pub use income::{handle_income_command, IncomeArgs};
pub use transaction::{
    handle_spend_command, handle_transfer_command, SpendArgs, TransferArgs,
};
