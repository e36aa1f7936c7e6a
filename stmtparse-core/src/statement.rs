//! Statement and transaction records produced by the parsing engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

/// Currency code assumed when a transaction row carries no foreign-currency
/// columns.
pub const HOME_CURRENCY: &str = "HKD";

/// A parsed statement: classification, nominal date, and transactions in
/// source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement classification, empty when unrecognized.
    #[serde(rename = "type")]
    pub kind: String,
    /// Nominal statement date; `None` when extraction failed.
    pub date: Option<NaiveDate>,
    pub transactions: Vec<Transaction>,
}

/// One debit row from the transaction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub post_date: NaiveDate,
    pub transaction_date: NaiveDate,
    /// Merchant text plus any continuation fragments, joined by "; ".
    pub description: String,
    /// Interior phrases left over after field assignment, joined by ", ".
    pub location: String,
    /// Foreign currency code, empty until postprocessing fills the default.
    pub currency: String,
    /// Amount in the foreign currency, 0 until postprocessing fills the
    /// default.
    #[serde(serialize_with = "round2")]
    pub local_amount: f64,
    /// Settlement amount in the home currency.
    #[serde(serialize_with = "round2")]
    pub amount: f64,
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

impl Statement {
    /// Resolve year attribution across the December/January boundary and fill
    /// home-currency defaults. Called once by `parse`; running it again would
    /// re-subtract years.
    pub fn post_process(&mut self) {
        if let Some(date) = self.date {
            // December statements carry no rows from the following January,
            // so no adjustment is needed (or safe) for them.
            if date.month() != 12 {
                for transaction in &mut self.transactions {
                    roll_back_year(&mut transaction.post_date, date.month());
                    roll_back_year(&mut transaction.transaction_date, date.month());
                }
            }
        }

        for transaction in &mut self.transactions {
            transaction.post_process();
        }
    }
}

/// A row month later than the statement month belongs to the previous
/// calendar year.
fn roll_back_year(date: &mut NaiveDate, statement_month: u32) {
    if date.month() > statement_month {
        if let Some(adjusted) = date.with_year(date.year() - 1) {
            *date = adjusted;
        }
    }
}

impl Transaction {
    /// A row with no foreign-currency columns was transacted in the home
    /// currency.
    pub fn post_process(&mut self) {
        if self.currency.is_empty() {
            self.currency = HOME_CURRENCY.to_string();
            self.local_amount = self.amount;
        }
    }
}
