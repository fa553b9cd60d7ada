//! Income distribution calculator
//!
//! Splits a lump income amount across envelopes so the allocations always
//! sum back to the income exactly: every envelope but the last receives the
//! rounded even share, and the last absorbs whatever rounding left over.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Envelope, EnvelopeId, Money};

/// Split `total` evenly across the envelopes, in their display order.
///
/// Each of the first N-1 envelopes gets `total / N` rounded to the nearest
/// cent (ties to even); the last gets the remainder, which guarantees the
/// shares sum to `total` exactly.
pub fn distribute_evenly(
    total: Money,
    envelopes: &[Envelope],
) -> LedgerResult<Vec<(EnvelopeId, Money)>> {
    if !total.is_positive() {
        return Err(LedgerError::Validation(
            "Income amount must be positive".into(),
        ));
    }
    if envelopes.is_empty() {
        return Err(LedgerError::Validation(
            "At least one envelope is required for distribution".into(),
        ));
    }

    let count = envelopes.len();
    let share = total.div_round_half_even(count as i64);

    let mut result = Vec::with_capacity(count);
    let mut allocated = Money::zero();
    for (i, envelope) in envelopes.iter().enumerate() {
        let amount = if i == count - 1 {
            total - allocated
        } else {
            allocated += share;
            share
        };
        result.push((envelope.id, amount));
    }

    Ok(result)
}

/// Check whether manually entered allocations sum to the income exactly.
///
/// Used as a save-gate only; amounts are never auto-corrected. Any negative
/// entry fails the check outright.
pub fn validate_manual_allocation(amounts: &[Money], total: Money) -> bool {
    if amounts.iter().any(|a| a.is_negative()) {
        return false;
    }
    let sum: Money = amounts.iter().copied().sum();
    sum == total
}
