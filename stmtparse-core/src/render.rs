//! JSON and CSV rendering of parsed statements.

use anyhow::{Context, Result};

use crate::statement::Statement;

/// Render a statement as indented JSON.
pub fn to_json(statement: &Statement) -> Result<String> {
    serde_json::to_string_pretty(statement).context("serializing statement to JSON")
}

/// Render a statement's transactions as CSV, one row per transaction.
///
/// Dates are `YYYY-MM-DD`, amounts fixed to two decimal places.
pub fn to_csv(statement: &Statement) -> Result<String> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record([
            "post_date",
            "transaction_date",
            "description",
            "location",
            "currency",
            "local_amount",
            "amount",
        ])?;
        for t in &statement.transactions {
            writer.write_record([
                t.post_date.format("%Y-%m-%d").to_string(),
                t.transaction_date.format("%Y-%m-%d").to_string(),
                t.description.clone(),
                t.location.clone(),
                t.currency.clone(),
                format!("{:.2}", t.local_amount),
                format!("{:.2}", t.amount),
            ])?;
        }
        writer.flush()?;
    }
    String::from_utf8(buffer).context("csv output was not valid UTF-8")
}
