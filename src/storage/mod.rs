//! Storage layer for envelope-ledger
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each user command mutates the in-memory repositories and then
//! commits with one atomic save, so a transaction and its income
//! allocations (stored inline) are written as a unit or not at all.

pub mod envelopes;
pub mod file_io;
pub mod transactions;

pub use envelopes::EnvelopeRepository;
pub use file_io::{read_json, write_json_atomic};
pub use transactions::TransactionRepository;

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub envelopes: EnvelopeRepository,
    pub transactions: TransactionRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            envelopes: EnvelopeRepository::new(paths.envelopes_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.envelopes.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.envelopes.save()?;
        self.transactions.save()?;
        Ok(())
    }
}
