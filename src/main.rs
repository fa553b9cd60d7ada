use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use envelope_ledger::cli::{
    handle_envelope_command, handle_export_command, handle_history_command,
    handle_income_command, handle_spend_command, handle_transfer_command, EnvelopeCommands,
    ExportArgs, HistoryArgs, IncomeArgs, SpendArgs, TransferArgs,
};
use envelope_ledger::config::{paths::LedgerPaths, settings::Settings};
use envelope_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "envl",
    version,
    about = "Terminal envelope-budgeting ledger",
    long_about = "envelope-ledger keeps your money in named envelopes: allocate \
                  income into them, spend from them, and move money between them. \
                  Balances are always derived from the full transaction history."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Envelope management commands
    #[command(subcommand, alias = "env")]
    Envelope(EnvelopeCommands),

    /// Record an expense from an envelope
    Spend(SpendArgs),

    /// Move money between envelopes
    Transfer(TransferArgs),

    /// Record income and allocate it into envelopes
    Income(IncomeArgs),

    /// Show the unified transaction history
    History(HistoryArgs),

    /// Export the ledger as CSV
    Export(ExportArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new().context("Failed to resolve data directory")?;
    let settings = Settings::load_or_create(&paths).context("Failed to load settings")?;
    let mut storage = Storage::new(paths).context("Failed to open storage")?;
    storage.load_all().context("Failed to load ledger data")?;

    match cli.command {
        Commands::Envelope(cmd) => handle_envelope_command(&storage, cmd)?,
        Commands::Spend(args) => handle_spend_command(&storage, args)?,
        Commands::Transfer(args) => handle_transfer_command(&storage, args)?,
        Commands::Income(args) => handle_income_command(&storage, args)?,
        Commands::History(args) => handle_history_command(&storage, args)?,
        Commands::Export(args) => handle_export_command(&storage, args)?,
        Commands::Config => {
            println!("Data directory: {}", storage.paths().base_dir().display());
            println!("Envelopes file: {}", storage.paths().envelopes_file().display());
            println!(
                "Transactions file: {}",
                storage.paths().transactions_file().display()
            );
            println!("Currency symbol: {}", settings.currency_symbol);
        }
    }

    Ok(())
}
