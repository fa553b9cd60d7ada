//! Service layer for envelope-ledger
//!
//! The service layer provides the ledger engine on top of the storage
//! layer: validation-first mutation commands and derived read queries
//! (balances, activity feeds, history aggregation, income distribution).

pub mod balance;
pub mod envelope;
pub mod history;
pub mod income;
pub mod transaction;

pub use balance::{ActivityItem, ActivityKind, BalanceService};
pub use envelope::{EnvelopeService, EnvelopeSummary};
pub use history::{HistoryFilter, HistoryItem, HistoryKind, HistoryService};
pub use income::{distribute_evenly, validate_manual_allocation};
pub use transaction::TransactionService;
