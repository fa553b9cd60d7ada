//! Income CLI command
//!
//! Records income either into a single envelope, split evenly across all
//! envelopes, or with explicit per-envelope allocations that must sum to
//! the income exactly.

use clap::Args;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::{distribute_evenly, validate_manual_allocation, EnvelopeService, TransactionService};
use crate::storage::Storage;

use super::envelope::{find_envelope, parse_amount};
use super::transaction::parse_date;

/// Arguments for recording income
#[derive(Args)]
pub struct IncomeArgs {
    /// Income amount
    pub amount: String,

    /// Put the full amount into this one envelope
    #[arg(long, conflicts_with_all = ["split_even", "alloc"])]
    pub to: Option<String>,

    /// Split the amount evenly across all envelopes (display order;
    /// the last envelope absorbs any rounding remainder)
    #[arg(long, conflicts_with = "alloc")]
    pub split_even: bool,

    /// Explicit allocation as ENVELOPE=AMOUNT (repeatable); the amounts
    /// must sum to the income exactly
    #[arg(long = "alloc", value_name = "ENVELOPE=AMOUNT")]
    pub alloc: Vec<String>,

    /// Transaction date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Handle the `income` command
pub fn handle_income_command(storage: &Storage, args: IncomeArgs) -> LedgerResult<()> {
    let amount = parse_amount(&args.amount)?;
    let date = parse_date(args.date.as_deref())?;
    let envelope_service = EnvelopeService::new(storage);
    let service = TransactionService::new(storage);

    if let Some(identifier) = &args.to {
        // Single envelope mode: all income goes to this envelope
        let envelope = find_envelope(&envelope_service, identifier)?;
        service.record_income_single(envelope.id, amount, date, args.note)?;
        println!("Recorded income of {} into {}.", amount, envelope.name);
        return Ok(());
    }

    if args.split_even {
        let envelopes = envelope_service.list_envelopes()?;
        let shares = distribute_evenly(amount, &envelopes)?;
        service.record_income(amount, date, args.note, shares.clone())?;

        println!("Recorded income of {} across {} envelopes:", amount, shares.len());
        for (envelope, (_, share)) in envelopes.iter().zip(shares.iter()) {
            println!("  {:<20} {}", envelope.name, share);
        }
        return Ok(());
    }

    if args.alloc.is_empty() {
        return Err(LedgerError::Validation(
            "Specify --to, --split-even, or at least one --alloc".into(),
        ));
    }

    let mut allocations = Vec::with_capacity(args.alloc.len());
    for entry in &args.alloc {
        let (identifier, amount_text) = entry.split_once('=').ok_or_else(|| {
            LedgerError::Validation(format!("Invalid allocation (want ENVELOPE=AMOUNT): {}", entry))
        })?;
        let envelope = find_envelope(&envelope_service, identifier.trim())?;
        let alloc_amount = parse_amount(amount_text.trim())?;
        allocations.push((envelope.id, alloc_amount));
    }

    // Save-gate: manual entry must match the income exactly, never
    // auto-corrected
    let amounts: Vec<Money> = allocations.iter().map(|(_, m)| *m).collect();
    if !validate_manual_allocation(&amounts, amount) {
        let allocated: Money = amounts.iter().copied().sum();
        return Err(LedgerError::AllocationMismatch {
            expected: amount.to_string(),
            allocated: allocated.to_string(),
        });
    }

    service.record_income(amount, date, args.note, allocations)?;
    println!("Recorded income of {}.", amount);

    Ok(())
}
