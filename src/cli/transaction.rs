//! Expense and transfer CLI commands

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::error::{LedgerError, LedgerResult};
use crate::services::{BalanceService, EnvelopeService, TransactionService};
use crate::storage::Storage;

use super::envelope::{find_envelope, parse_amount};

/// Arguments for recording an expense
#[derive(Args)]
pub struct SpendArgs {
    /// Envelope name or ID to spend from
    pub envelope: String,
    /// Amount (e.g. "30" or "29.99")
    pub amount: String,
    /// Transaction date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments for recording a transfer
#[derive(Args)]
pub struct TransferArgs {
    /// Source envelope name or ID
    pub from: String,
    /// Target envelope name or ID
    pub to: String,
    /// Amount
    pub amount: String,
    /// Transaction date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Handle the `spend` command
pub fn handle_spend_command(storage: &Storage, args: SpendArgs) -> LedgerResult<()> {
    let envelope_service = EnvelopeService::new(storage);
    let envelope = find_envelope(&envelope_service, &args.envelope)?;
    let amount = parse_amount(&args.amount)?;
    let date = parse_date(args.date.as_deref())?;

    let service = TransactionService::new(storage);
    service.record_expense(envelope.id, amount, date, args.note)?;

    let balance = BalanceService::new(storage).balance(envelope.id);
    println!("Recorded expense of {} from {}.", amount, envelope.name);
    if balance.is_negative() {
        println!("Warning: {} is now overspent ({}).", envelope.name, balance);
    } else {
        println!("New balance: {}", balance);
    }

    Ok(())
}

/// Handle the `transfer` command
pub fn handle_transfer_command(storage: &Storage, args: TransferArgs) -> LedgerResult<()> {
    let envelope_service = EnvelopeService::new(storage);
    let source = find_envelope(&envelope_service, &args.from)?;
    let target = find_envelope(&envelope_service, &args.to)?;
    let amount = parse_amount(&args.amount)?;
    let date = parse_date(args.date.as_deref())?;

    let service = TransactionService::new(storage);
    service.record_transfer(source.id, target.id, amount, date, args.note)?;

    let balances = BalanceService::new(storage);
    println!(
        "Transferred {} from {} to {}.",
        amount, source.name, target.name
    );
    println!(
        "{}: {}   {}: {}",
        source.name,
        balances.balance(source.id),
        target.name,
        balances.balance(target.id)
    );

    Ok(())
}

/// Parse a YYYY-MM-DD date, defaulting to today
pub fn parse_date(s: Option<&str>) -> LedgerResult<NaiveDate> {
    match s {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| LedgerError::Validation(format!("Invalid date (want YYYY-MM-DD): {}", text))),
        None => Ok(Local::now().date_naive()),
    }
}
