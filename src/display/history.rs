//! History display formatting

use crate::services::HistoryItem;

/// Format history items as a table, most recent first
pub fn format_history(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No matching history.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{}  {:>12}  {:<24}  {:<16}  {}\n",
        "Date", "Amount", "Detail", "Envelope", "Note"
    ));
    output.push_str(&format!(
        "{:-<10}  {:->12}  {:-<24}  {:-<16}  {:-<20}\n",
        "", "", "", "", ""
    ));

    for item in items {
        output.push_str(&format!(
            "{}  {:>12}  {:<24}  {:<16}  {}\n",
            item.date.format("%Y-%m-%d"),
            item.amount.to_string(),
            item.detail,
            item.envelope_name.as_deref().unwrap_or(""),
            item.note.as_deref().unwrap_or(""),
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let output = format_history(&[]);
        assert!(output.contains("No matching history"));
    }
}
