//! HSBC HK credit-card statement parser (pdftotext -layout output).
//!
//! Expected transaction section after PDF-to-text, columns aligned with runs
//! of spaces:
//!
//!   POST DATE  TRANS DATE  DESCRIPTION        LOCATION       CURRENCY  LOCAL AMT  AMOUNT
//!   12SEP      10SEP       Momo Kingdom Ltd   Ealing    GB   GBP       8.99       97.03
//!                          APPLE PAY-MOBILE:9999
//!
//! Rows only carry DDMMM dates; the statement date supplies the year, and a
//! later pass rolls rows across the December/January boundary back a year.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use log::warn;
use regex::Regex;

use crate::statement::{Statement, Transaction};

/// Parse extracted statement text into a [`Statement`].
///
/// Unrecognized statement type or an unextractable statement date degrade the
/// result (empty type, `None` date, no year correction) with a warning;
/// malformed transaction rows are an error.
pub fn parse(text: &str) -> Result<Statement> {
    let lines: Vec<&str> = text.lines().collect();

    let kind = extract_statement_kind(&lines);
    let date = extract_statement_date(&lines)?;
    let section = extract_transaction_lines(&lines)?;

    // Missing statement date leaves the zero-value year, matching the
    // degraded metadata.
    let reference_year = date.map_or(1, |d| d.year());
    let transactions = build_transactions(&section, reference_year)?;

    let mut statement = Statement {
        kind,
        date,
        transactions,
    };
    statement.post_process();
    Ok(statement)
}

/// Classify the statement from its title line, or return an empty string.
fn extract_statement_kind(lines: &[&str]) -> String {
    for line in lines {
        let upper = line.to_uppercase();
        if !upper.contains("STATEMENT") {
            continue;
        }
        if upper.contains("VISA SIGNATURE") {
            return "HSBC Visa Signature".to_string();
        }
        if upper.contains("HSBC RED") {
            return "HSBC Red".to_string();
        }
    }
    String::new()
}

/// Find the nominal statement date: a "STATEMENT DATE" header with the value
/// on the following line. Any failure degrades to `None` with a warning;
/// the caller then skips year-boundary correction.
fn extract_statement_date(lines: &[&str]) -> Result<Option<NaiveDate>> {
    let date_re = Regex::new(r"\b\d{1,2}\s+[A-Z]{3}\s+\d{4}\b")?;

    for (i, line) in lines.iter().enumerate() {
        if !line.to_uppercase().contains("STATEMENT DATE") {
            continue;
        }
        let Some(next) = lines.get(i + 1) else {
            break;
        };

        let date_line = next.trim();
        let Some(found) = date_re.find(date_line) else {
            warn!("statement date pattern not found in line {date_line:?}");
            return Ok(None);
        };

        match NaiveDate::parse_from_str(found.as_str(), "%d %b %Y") {
            Ok(date) => return Ok(Some(date)),
            Err(err) => {
                warn!("statement date {:?} did not parse: {err}", found.as_str());
                return Ok(None);
            }
        }
    }

    warn!("statement date not found in text");
    Ok(None)
}

/// Line-classification state carried through the section scan.
struct SectionState {
    in_section: bool,
    in_transaction: bool,
}

/// Collect the trimmed lines that belong to the transaction table body.
///
/// The section opens at the column-header line. Below it, a date-pair prefix
/// opens a transaction and is always kept; other non-blank lines are kept
/// only while a transaction is open; a blank line closes it. Page footers and
/// other interstitial text between transactions are dropped.
fn extract_transaction_lines(lines: &[&str]) -> Result<Vec<String>> {
    let start_re = Regex::new(r"^\d{2}[A-Z]{3}\s+\d{2}[A-Z]{3}")?;

    let mut state = SectionState {
        in_section: false,
        in_transaction: false,
    };
    let mut kept = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();

        if upper.contains("POST DATE") && upper.contains("TRANS DATE") {
            state.in_section = true;
            state.in_transaction = false;
            continue;
        }
        if !state.in_section {
            continue;
        }

        if trimmed.is_empty() {
            state.in_transaction = false;
            continue;
        }

        if start_re.is_match(trimmed) {
            state.in_transaction = true;
            kept.push(trimmed.to_string());
            continue;
        }

        if state.in_transaction {
            kept.push(trimmed.to_string());
        }
    }

    Ok(kept)
}

/// End of the phrase starting at the beginning of `text`.
///
/// A phrase runs until two consecutive spaces or end of line; a single
/// embedded space stays inside the phrase, so multi-word merchant names hold
/// together while column gaps split fields.
fn phrase_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut end = 0;
    while end < n {
        while end < n && bytes[end] != b' ' {
            end += 1;
        }
        if end == n {
            return n;
        }
        if end + 1 == n || bytes[end + 1] == b' ' {
            return end;
        }
        end += 1;
    }
    n
}

/// Split a line into phrases on the double-space boundary rule.
fn split_phrases(line: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        let end = phrase_end(rest);
        phrases.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    phrases
}

/// Parse a DDMMM row token against the reference year.
fn parse_day_month(token: &str, year: i32) -> Result<NaiveDate> {
    let dated = format!("{token}{year:04}");
    NaiveDate::parse_from_str(&dated, "%d%b%Y")
        .with_context(|| format!("invalid date token {token:?}"))
}

/// Parse an amount column, tolerating thousands separators.
fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned = raw.replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid amount {raw:?}"))
}

/// Build transactions from the extracted section lines.
///
/// Field layout per row: post date, transaction date, first description
/// phrase, then optional location phrases, an optional currency code +
/// local-amount pair, and finally the settlement amount. Single-phrase lines
/// are continuation fragments appended to the previous row's description.
/// Rows whose final phrase carries the "CR" credit marker are dropped.
fn build_transactions(lines: &[String], year: i32) -> Result<Vec<Transaction>> {
    let mut transactions: Vec<Transaction> = Vec::new();

    for line in lines {
        let phrases = split_phrases(line);
        if phrases.is_empty() {
            continue;
        }

        if phrases.len() == 1 {
            // Continuation fragment: payment-method or exchange-rate note.
            let last = transactions
                .len()
                .checked_sub(1)
                .with_context(|| format!("continuation line before any transaction: {line:?}"))?;
            let description = &mut transactions[last].description;
            description.push_str("; ");
            description.push_str(&phrases[0]);
            continue;
        }

        // Credit rows (refunds, payment offsets) are never materialized.
        if phrases[phrases.len() - 1].ends_with("CR") {
            continue;
        }

        if phrases.len() < 4 {
            bail!("transaction line has too few columns: {line:?}");
        }

        let post_date = parse_day_month(&phrases[0], year)?;
        let transaction_date = parse_day_month(&phrases[1], year)?;
        let amount = parse_amount(&phrases[phrases.len() - 1])?;

        let mut transaction = Transaction {
            post_date,
            transaction_date,
            description: phrases[2].clone(),
            location: String::new(),
            currency: String::new(),
            local_amount: 0.0,
            amount,
        };

        // Interior phrases hold location text and, when present, a trailing
        // currency code + local-amount pair. Whether the trailing phrase
        // parses as a number is the only signal distinguishing the two
        // shapes, so a location ending in a numeric token can misclassify.
        let mut interior = &phrases[3..phrases.len() - 1];
        if interior.len() >= 2 {
            if let Ok(local_amount) = parse_amount(&interior[interior.len() - 1]) {
                transaction.local_amount = local_amount;
                transaction.currency = interior[interior.len() - 2].clone();
                interior = &interior[..interior.len() - 2];
            }
        }
        if !interior.is_empty() {
            transaction.location = interior.join(", ");
        }

        transactions.push(transaction);
    }

    Ok(transactions)
}
