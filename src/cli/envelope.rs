//! Envelope CLI commands
//!
//! Implements CLI commands for envelope management.

use clap::Subcommand;

use crate::display::{format_envelope_details, format_envelope_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EnvelopeId, Money, ENVELOPE_ICONS};
use crate::services::{BalanceService, EnvelopeService, EnvelopeSummary};
use crate::storage::Storage;

/// Envelope subcommands
#[derive(Subcommand)]
pub enum EnvelopeCommands {
    /// List all envelopes with balances
    List,

    /// Show envelope details and recent activity
    Show {
        /// Envelope name or ID
        envelope: String,
        /// Number of activity entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Create a new envelope
    Create {
        /// Envelope name
        name: String,
        /// Icon slug (see `envelope icons`)
        #[arg(short, long)]
        icon: Option<String>,
        /// Target amount (e.g. "500" or "500.00")
        #[arg(long)]
        target: Option<String>,
    },

    /// Edit an envelope
    Edit {
        /// Envelope name or ID
        envelope: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New icon slug
        #[arg(short, long)]
        icon: Option<String>,
        /// New target amount
        #[arg(long)]
        target: Option<String>,
        /// Clear the target
        #[arg(long)]
        clear_target: bool,
    },

    /// Reorder envelopes (list every envelope name or ID in the new order)
    Reorder {
        /// Envelope names or IDs, first to last
        envelopes: Vec<String>,
    },

    /// Delete an envelope
    Delete {
        /// Envelope name or ID
        envelope: String,
    },

    /// List the available icon slugs
    Icons,
}

/// Handle an envelope command
pub fn handle_envelope_command(storage: &Storage, cmd: EnvelopeCommands) -> LedgerResult<()> {
    let service = EnvelopeService::new(storage);

    match cmd {
        EnvelopeCommands::List => {
            let summaries = service.envelope_overview()?;
            print!("{}", format_envelope_list(&summaries));
        }

        EnvelopeCommands::Show { envelope, limit } => {
            let envelope = find_envelope(&service, &envelope)?;
            let balance_service = BalanceService::new(storage);
            let balance = balance_service.balance(envelope.id);
            let progress = envelope.progress(balance);
            let activity = balance_service.recent_activity(envelope.id, limit);

            let summary = EnvelopeSummary {
                envelope,
                balance,
                progress,
            };
            print!("{}", format_envelope_details(&summary, &activity));
        }

        EnvelopeCommands::Create { name, icon, target } => {
            let target = target.map(|t| parse_amount(&t)).transpose()?;
            let envelope = service.create_envelope(&name, icon.as_deref(), target)?;

            println!("Created envelope: {}", envelope.name);
            println!("  Icon: {}", envelope.icon);
            println!("  ID: {}", envelope.id);
        }

        EnvelopeCommands::Edit {
            envelope,
            name,
            icon,
            target,
            clear_target,
        } => {
            let existing = find_envelope(&service, &envelope)?;

            if name.is_none() && icon.is_none() && target.is_none() && !clear_target {
                println!("No changes specified. Use --name, --icon, --target, or --clear-target.");
                return Ok(());
            }

            let target = if clear_target {
                Some(None)
            } else {
                target.map(|t| parse_amount(&t)).transpose()?.map(Some)
            };

            let updated =
                service.update_envelope(existing.id, name.as_deref(), icon.as_deref(), target)?;
            println!("Updated envelope: {}", updated.name);
        }

        EnvelopeCommands::Reorder { envelopes } => {
            let ids: Vec<EnvelopeId> = envelopes
                .iter()
                .map(|identifier| find_envelope(&service, identifier).map(|e| e.id))
                .collect::<LedgerResult<_>>()?;

            service.reorder_envelopes(&ids)?;
            println!("Reordered {} envelopes.", ids.len());
        }

        EnvelopeCommands::Delete { envelope } => {
            let envelope = find_envelope(&service, &envelope)?;
            service.delete_envelope(envelope.id)?;
            println!("Deleted envelope: {}", envelope.name);
        }

        EnvelopeCommands::Icons => {
            for icon in ENVELOPE_ICONS {
                println!("{}", icon);
            }
        }
    }

    Ok(())
}

/// Resolve an envelope by name or ID, or fail with NotFound
pub fn find_envelope(
    service: &EnvelopeService<'_>,
    identifier: &str,
) -> LedgerResult<crate::models::Envelope> {
    service
        .find(identifier)?
        .ok_or_else(|| LedgerError::envelope_not_found(identifier))
}

/// Parse a positive-or-zero CLI amount
pub fn parse_amount(s: &str) -> LedgerResult<Money> {
    Money::parse(s).map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))
}
