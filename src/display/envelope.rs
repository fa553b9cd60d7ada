//! Envelope display formatting
//!
//! Formats envelopes and balances for terminal output in table and detail
//! views.

use crate::services::{ActivityItem, ActivityKind, EnvelopeSummary};

/// Format the envelope overview as a table
pub fn format_envelope_list(summaries: &[EnvelopeSummary]) -> String {
    if summaries.is_empty() {
        return "No envelopes yet. Create one with `envl envelope create <name>`.\n".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.envelope.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:>8}  {}\n",
        "Name",
        "Balance",
        "Target",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:->8}  {:-<10}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for summary in summaries {
        let target = summary
            .envelope
            .target_amount
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());

        let status = if summary.balance.is_negative() {
            "over-budget".to_string()
        } else if summary.envelope.target_amount.is_some() {
            format!("{}%", (summary.progress * 100.0).round() as i64)
        } else {
            String::new()
        };

        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:>8}  {}\n",
            summary.envelope.name,
            summary.balance.to_string(),
            target,
            status,
            name_width = name_width,
        ));
    }

    output
}

/// Format a single envelope's details with its recent activity
pub fn format_envelope_details(summary: &EnvelopeSummary, activity: &[ActivityItem]) -> String {
    let envelope = &summary.envelope;
    let mut output = String::new();

    output.push_str(&format!("Envelope: {}\n", envelope.name));
    output.push_str(&format!("  Icon:     {}\n", envelope.icon));
    output.push_str(&format!("  Balance:  {}\n", summary.balance));
    if let Some(target) = envelope.target_amount {
        output.push_str(&format!(
            "  Target:   {} ({}%)\n",
            target,
            (summary.progress * 100.0).round() as i64
        ));
    }
    if summary.balance.is_negative() {
        output.push_str("  Warning:  envelope is overspent\n");
    }
    output.push_str(&format!("  ID:       {}\n", envelope.id));

    if !activity.is_empty() {
        output.push_str("\nRecent activity:\n");
        for item in activity {
            let label = match item.kind {
                ActivityKind::Expense => "expense".to_string(),
                ActivityKind::Income => "income".to_string(),
                ActivityKind::TransferOut => format!(
                    "transfer to {}",
                    item.envelope_name.as_deref().unwrap_or("envelope")
                ),
                ActivityKind::TransferIn => format!(
                    "transfer from {}",
                    item.envelope_name.as_deref().unwrap_or("envelope")
                ),
            };
            output.push_str(&format!(
                "  {}  {:>12}  {:<24}  {}\n",
                item.date.format("%Y-%m-%d"),
                item.amount.to_string(),
                label,
                item.note.as_deref().unwrap_or(""),
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Envelope, Money};

    fn summary(name: &str, balance_cents: i64, target_cents: Option<i64>) -> EnvelopeSummary {
        let mut envelope = Envelope::new(name, "envelope");
        envelope.target_amount = target_cents.map(Money::from_cents);
        let balance = Money::from_cents(balance_cents);
        let progress = envelope.progress(balance);
        EnvelopeSummary {
            envelope,
            balance,
            progress,
        }
    }

    #[test]
    fn test_empty_list() {
        let output = format_envelope_list(&[]);
        assert!(output.contains("No envelopes yet"));
    }

    #[test]
    fn test_list_shows_balances_and_progress() {
        let summaries = vec![
            summary("Groceries", 5000, Some(10000)),
            summary("Fun", -250, None),
        ];

        let output = format_envelope_list(&summaries);
        assert!(output.contains("Groceries"));
        assert!(output.contains("$50.00"));
        assert!(output.contains("50%"));
        assert!(output.contains("over-budget"));
    }

    #[test]
    fn test_details_warns_when_overspent() {
        let output = format_envelope_details(&summary("Fun", -1000, None), &[]);
        assert!(output.contains("overspent"));
    }
}
