//! Delimited-text statement parser
//!
//! Parses the delimited export format used by AMEX statements. The format
//! has a fixed, ordered column header and rows whose free-text fields may
//! contain embedded newlines, tabs, quoted commas and apostrophes, so row
//! recovery goes through the [`row_lexer`](crate::import::row_lexer)
//! rather than a line split.
//!
//! # Error Handling
//!
//! Parsing is all-or-nothing: an empty file, a header mismatch or any
//! single row that fails to parse aborts the whole import. No partial
//! ledger is ever produced from a malformed statement.

use crate::import::row_lexer::lex_rows;
use crate::import::{ImporterConfig, StatementImporter};
use crate::types::{ImportError, PendingTransaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// The exact, ordered column header an AMEX export must open with
pub const AMEX_HEADER: &str = "Date,Date Processed,Description,Amount,\
Foreign Spend Amount,Commission,Exchange Rate,Additional Information,\
Appears On Your Statement As,Address,Town/City,Postcode,Country,Reference";

const FIELD_COUNT: usize = 14;
const DATE_COL: usize = 0;
const DESCRIPTION_COL: usize = 2;
const AMOUNT_COL: usize = 3;
const REFERENCE_COL: usize = 13;

/// Statement date format: day/month/year
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Importer for delimited AMEX statement exports
///
/// Holds the raw statement bytes and the per-run configuration. Amounts
/// are sign-inverted on the way in: the statement records spend as
/// positive, the pipeline stores spend as negative so the formatter can
/// emit the two posting lines directly.
#[derive(Debug)]
pub struct AmexCsvImporter {
    data: Vec<u8>,
    config: ImporterConfig,
}

impl AmexCsvImporter {
    /// Create an importer over raw statement bytes
    pub fn new(data: Vec<u8>, config: ImporterConfig) -> Self {
        AmexCsvImporter { data, config }
    }

    fn parse_row(&self, index: usize, row: &str) -> Result<PendingTransaction, ImportError> {
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(ImportError::parse(
                index,
                format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
            ));
        }

        let date = NaiveDate::parse_from_str(fields[DATE_COL], DATE_FORMAT).map_err(|e| {
            ImportError::parse(index, format!("invalid date '{}': {}", fields[DATE_COL], e))
        })?;

        let amount = Decimal::from_str(fields[AMOUNT_COL]).map_err(|e| {
            ImportError::parse(
                index,
                format!("invalid amount '{}': {}", fields[AMOUNT_COL], e),
            )
        })?;

        Ok(PendingTransaction {
            index,
            date,
            description: fields[DESCRIPTION_COL].to_string(),
            amount: -amount,
            reference: fields[REFERENCE_COL].to_string(),
            account: self.config.account.clone(),
            commodity: self.config.commodity.clone(),
        })
    }
}

impl StatementImporter for AmexCsvImporter {
    /// Parse the statement into pending transactions in row order
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input is empty (`EmptyInput`)
    /// - the first line does not equal [`AMEX_HEADER`] exactly (`HeaderMismatch`)
    /// - any row has a bad field count, date or amount (`ParseError`)
    fn import(&self) -> Result<Vec<PendingTransaction>, ImportError> {
        if self.data.is_empty() {
            return Err(ImportError::EmptyInput);
        }

        let (header, body) = match self.data.iter().position(|&b| b == b'\n') {
            Some(pos) => (&self.data[..pos], &self.data[pos + 1..]),
            None => (&self.data[..], &self.data[..0]),
        };

        if header != AMEX_HEADER.as_bytes() {
            return Err(ImportError::HeaderMismatch);
        }

        lex_rows(body)
            .iter()
            .enumerate()
            .map(|(index, row)| self.parse_row(index, row))
            .collect()
    }
}
