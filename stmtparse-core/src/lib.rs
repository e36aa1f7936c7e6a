//! stmtparse-core: parsing engine for HSBC HK credit-card statement text.
//!
//! Input is the text `pdftotext -layout` produces from a statement PDF, with
//! column alignment preserved as runs of spaces. [`parse`] turns it into a
//! [`Statement`]; [`render`] turns a statement into JSON or CSV.

pub mod parser;
pub mod render;
pub mod statement;

pub use parser::parse;
pub use statement::{HOME_CURRENCY, Statement, Transaction};
