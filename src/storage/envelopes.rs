//! Envelope repository for JSON storage
//!
//! Manages loading and saving envelopes to envelopes.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Envelope, EnvelopeId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable envelope data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EnvelopeData {
    envelopes: Vec<Envelope>,
}

/// Repository for envelope persistence
pub struct EnvelopeRepository {
    path: PathBuf,
    data: RwLock<HashMap<EnvelopeId, Envelope>>,
}

impl EnvelopeRepository {
    /// Create a new envelope repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load envelopes from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: EnvelopeData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for envelope in file_data.envelopes {
            data.insert(envelope.id, envelope);
        }

        Ok(())
    }

    /// Save envelopes to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut envelopes: Vec<_> = data.values().cloned().collect();
        envelopes.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });

        let file_data = EnvelopeData { envelopes };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get an envelope by ID
    pub fn get(&self, id: EnvelopeId) -> Result<Option<Envelope>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get an envelope by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Envelope>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    /// Get all envelopes ordered by sort order
    pub fn get_all(&self) -> Result<Vec<Envelope>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut envelopes: Vec<_> = data.values().cloned().collect();
        envelopes.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(envelopes)
    }

    /// Insert or update an envelope
    pub fn upsert(&self, envelope: Envelope) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(envelope.id, envelope);
        Ok(())
    }

    /// Delete an envelope
    pub fn delete(&self, id: EnvelopeId) -> Result<bool, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count envelopes
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
