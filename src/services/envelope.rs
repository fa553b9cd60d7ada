//! Envelope service
//!
//! Business logic for creating, editing, reordering, and deleting envelopes.
//! Deletion never silently destroys spending history: an envelope referenced
//! by any expense or transfer cannot be deleted, while income allocations
//! targeting it cascade (their parent income transactions shrink by the
//! removed amounts, and a parent left with no allocations is removed).

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Envelope, EnvelopeId, Money, TransactionKind, DEFAULT_ICON};
use crate::services::BalanceService;
use crate::storage::Storage;

/// Service for envelope management
pub struct EnvelopeService<'a> {
    storage: &'a Storage,
}

/// An envelope with its derived balance, for list displays
#[derive(Debug, Clone)]
pub struct EnvelopeSummary {
    pub envelope: Envelope,
    pub balance: Money,
    /// Balance vs. target, clamped to 0.0..=1.0 (1.0 when no target is set)
    pub progress: f64,
}

impl<'a> EnvelopeService<'a> {
    /// Create a new envelope service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new envelope.
    ///
    /// The new envelope is appended to the display order: its sort order is
    /// the current envelope count.
    pub fn create_envelope(
        &self,
        name: &str,
        icon: Option<&str>,
        target: Option<Money>,
    ) -> LedgerResult<Envelope> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Envelope name cannot be empty".into()));
        }

        // Check for duplicate name
        if self.storage.envelopes.get_by_name(name)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Envelope",
                identifier: name.to_string(),
            });
        }

        let sort_order = self.storage.envelopes.count()? as i32;
        let mut envelope =
            Envelope::with_sort_order(name, icon.unwrap_or(DEFAULT_ICON), sort_order);
        envelope.target_amount = target;

        envelope
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.envelopes.upsert(envelope.clone())?;
        self.storage.envelopes.save()?;

        Ok(envelope)
    }

    /// Get an envelope by ID
    pub fn get(&self, id: EnvelopeId) -> LedgerResult<Option<Envelope>> {
        self.storage.envelopes.get(id)
    }

    /// Find an envelope by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Envelope>> {
        // Try by name first
        if let Some(envelope) = self.storage.envelopes.get_by_name(identifier)? {
            return Ok(Some(envelope));
        }

        // Try parsing as ID
        if let Ok(id) = identifier.parse::<EnvelopeId>() {
            return self.storage.envelopes.get(id);
        }

        Ok(None)
    }

    /// List all envelopes in display order
    pub fn list_envelopes(&self) -> LedgerResult<Vec<Envelope>> {
        self.storage.envelopes.get_all()
    }

    /// List all envelopes with their derived balances, in display order
    pub fn envelope_overview(&self) -> LedgerResult<Vec<EnvelopeSummary>> {
        let balance_service = BalanceService::new(self.storage);
        let envelopes = self.storage.envelopes.get_all()?;

        Ok(envelopes
            .into_iter()
            .map(|envelope| {
                let balance = balance_service.balance(envelope.id);
                let progress = envelope.progress(balance);
                EnvelopeSummary {
                    envelope,
                    balance,
                    progress,
                }
            })
            .collect())
    }

    /// Update an envelope's name, icon, and/or target
    pub fn update_envelope(
        &self,
        id: EnvelopeId,
        name: Option<&str>,
        icon: Option<&str>,
        target: Option<Option<Money>>,
    ) -> LedgerResult<Envelope> {
        let mut envelope = self
            .storage
            .envelopes
            .get(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

        if let Some(new_name) = name {
            let new_name = new_name.trim();
            if new_name.is_empty() {
                return Err(LedgerError::Validation("Envelope name cannot be empty".into()));
            }

            // Check for duplicate
            if let Some(existing) = self.storage.envelopes.get_by_name(new_name)? {
                if existing.id != id {
                    return Err(LedgerError::Duplicate {
                        entity_type: "Envelope",
                        identifier: new_name.to_string(),
                    });
                }
            }

            envelope.name = new_name.to_string();
        }

        if let Some(new_icon) = icon {
            envelope.icon = new_icon.to_string();
        }

        if let Some(new_target) = target {
            envelope.target_amount = new_target;
        }

        envelope
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.envelopes.upsert(envelope.clone())?;
        self.storage.envelopes.save()?;

        Ok(envelope)
    }

    /// Reorder envelopes to match the given ID sequence.
    ///
    /// The sequence must be a permutation of all envelope IDs; sort orders
    /// are reassigned 0..N in the given order.
    pub fn reorder_envelopes(&self, ordered_ids: &[EnvelopeId]) -> LedgerResult<()> {
        let envelopes = self.storage.envelopes.get_all()?;

        if ordered_ids.len() != envelopes.len() {
            return Err(LedgerError::Validation(format!(
                "Reorder must list all {} envelopes (got {})",
                envelopes.len(),
                ordered_ids.len()
            )));
        }

        let mut remaining: std::collections::HashMap<_, _> =
            envelopes.into_iter().map(|e| (e.id, e)).collect();

        let mut reordered = Vec::with_capacity(ordered_ids.len());
        for (position, id) in ordered_ids.iter().enumerate() {
            let mut envelope = remaining
                .remove(id)
                .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;
            envelope.sort_order = position as i32;
            reordered.push(envelope);
        }

        for envelope in reordered {
            self.storage.envelopes.upsert(envelope)?;
        }
        self.storage.envelopes.save()?;

        Ok(())
    }

    /// Delete an envelope.
    ///
    /// Blocked with `EnvelopeInUse` while any expense or transfer references
    /// the envelope. Income allocations into it cascade: each parent income
    /// transaction loses those allocations and its amount is reduced by the
    /// same sum, and a parent with no allocations left is deleted. The whole
    /// removal commits as one unit of work.
    pub fn delete_envelope(&self, id: EnvelopeId) -> LedgerResult<()> {
        let envelope = self
            .storage
            .envelopes
            .get(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

        let references = self.storage.transactions.spending_references(id)?;
        if references > 0 {
            return Err(LedgerError::EnvelopeInUse {
                name: envelope.name,
                references,
            });
        }

        // Cascade income allocations targeting this envelope
        for (parent, _) in self.storage.transactions.allocations_for(id)? {
            let mut parent = parent;
            let removed: Money = parent
                .allocations()
                .iter()
                .filter(|a| a.envelope_id == id)
                .map(|a| a.amount)
                .sum();

            if let TransactionKind::Income { allocations } = &mut parent.kind {
                allocations.retain(|a| a.envelope_id != id);
                if allocations.is_empty() {
                    self.storage.transactions.delete(parent.id)?;
                    continue;
                }
            }
            parent.amount -= removed;
            self.storage.transactions.upsert(parent)?;
        }

        self.storage.envelopes.delete(id)?;
        self.storage.save_all()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{IncomeAllocation, Transaction};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_create_assigns_next_sort_order() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let first = service.create_envelope("Groceries", Some("cart"), None).unwrap();
        let second = service.create_envelope("Fun", None, None).unwrap();

        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert_eq!(second.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        service.create_envelope("Groceries", None, None).unwrap();
        let result = service.create_envelope("groceries", None, None);
        assert!(matches!(result, Err(LedgerError::Duplicate { .. })));
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        assert!(service.create_envelope("   ", None, None).is_err());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let envelope = service.create_envelope("Groceries", None, None).unwrap();

        assert!(service.find("groceries").unwrap().is_some());
        assert!(service
            .find(&envelope.id.as_uuid().to_string())
            .unwrap()
            .is_some());
        assert!(service.find("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_envelope() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let envelope = service.create_envelope("Groceries", None, None).unwrap();

        let updated = service
            .update_envelope(
                envelope.id,
                Some("Food"),
                Some("dining"),
                Some(Some(Money::from_cents(50000))),
            )
            .unwrap();

        assert_eq!(updated.name, "Food");
        assert_eq!(updated.icon, "dining");
        assert_eq!(updated.target_amount, Some(Money::from_cents(50000)));

        // Clear the target
        let cleared = service
            .update_envelope(envelope.id, None, None, Some(None))
            .unwrap();
        assert!(cleared.target_amount.is_none());
    }

    #[test]
    fn test_reorder_envelopes() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let a = service.create_envelope("A", None, None).unwrap();
        let b = service.create_envelope("B", None, None).unwrap();
        let c = service.create_envelope("C", None, None).unwrap();

        service.reorder_envelopes(&[c.id, a.id, b.id]).unwrap();

        let names: Vec<_> = service
            .list_envelopes()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_rejects_partial_permutation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let a = service.create_envelope("A", None, None).unwrap();
        service.create_envelope("B", None, None).unwrap();

        let result = service.reorder_envelopes(&[a.id]);
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_delete_unreferenced_envelope() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let envelope = service.create_envelope("Groceries", None, None).unwrap();
        service.delete_envelope(envelope.id).unwrap();

        assert!(service.list_envelopes().unwrap().is_empty());
    }

    #[test]
    fn test_delete_blocked_by_spending_references() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let envelope = service.create_envelope("Groceries", None, None).unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(
                envelope.id,
                Money::from_cents(500),
                test_date(),
                None,
            ))
            .unwrap();

        let result = service.delete_envelope(envelope.id);
        assert!(matches!(
            result,
            Err(LedgerError::EnvelopeInUse { references: 1, .. })
        ));

        // The envelope and its history are untouched
        assert_eq!(service.list_envelopes().unwrap().len(), 1);
        assert_eq!(storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_cascades_income_allocations() {
        let (_temp_dir, storage) = create_test_storage();
        let service = EnvelopeService::new(&storage);

        let groceries = service.create_envelope("Groceries", None, None).unwrap();
        let fun = service.create_envelope("Fun", None, None).unwrap();

        // One income split across both envelopes, one only into Groceries
        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(10000),
                test_date(),
                None,
                vec![
                    IncomeAllocation::new(groceries.id, Money::from_cents(6000)),
                    IncomeAllocation::new(fun.id, Money::from_cents(4000)),
                ],
            ))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::income(
                Money::from_cents(2000),
                test_date(),
                None,
                vec![IncomeAllocation::new(groceries.id, Money::from_cents(2000))],
            ))
            .unwrap();

        service.delete_envelope(groceries.id).unwrap();

        // The shared income shrank to the surviving allocation; the
        // Groceries-only income is gone entirely
        let remaining = storage.transactions.get_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].amount.cents(), 4000);
        assert_eq!(remaining[0].allocations_total().cents(), 4000);
        assert!(remaining[0].validate().is_ok());
    }
}
