//! envelope-ledger - Terminal envelope-budgeting ledger
//!
//! This library implements an envelope-budgeting ledger: money is
//! partitioned into named envelopes, income is allocated into them, and
//! spending draws them down. Balances are never stored; every read
//! recomputes from the full transaction set, so reads always reflect the
//! latest committed state.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (envelopes, transactions, allocations)
//! - `storage`: JSON file storage layer
//! - `services`: The ledger engine (commands and derived queries)
//! - `export`: Flat-row projection and CSV rendering
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `envl` binary

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
