//! Minimal OFX 1.x statement decoder
//!
//! Decodes the SGML-flavoured OFX tag stream a bank export contains into
//! typed [`OfxRecord`] values, one per `<STMTTRN>` aggregate. Only the
//! fields the import pipeline consumes are retained; everything else in
//! the document (headers, sign-on blocks, balances) is skipped.
//!
//! OFX 1.x leaf tags are not closed: `<TRNAMT>-12.50` runs to the next
//! `<`. Aggregate tags (`<STMTTRN>`, `<PAYEE>`) have matching close tags.

use crate::types::ImportError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Counterparty block of a transaction, when the bank supplies one
#[derive(Debug, Clone, PartialEq)]
pub struct OfxPayee {
    pub name: String,
    pub state: Option<String>,
}

/// One decoded `<STMTTRN>` aggregate
///
/// Optional fields are `None` when the tag was absent or empty in the
/// source document.
#[derive(Debug, Clone, PartialEq)]
pub struct OfxRecord {
    /// External transaction id (`FITID`)
    pub fitid: String,
    /// Transaction name (`NAME`)
    pub name: Option<String>,
    /// Free-text memo (`MEMO`)
    pub memo: Option<String>,
    /// Counterparty details (`PAYEE` aggregate)
    pub payee: Option<OfxPayee>,
    /// Check number (`CHECKNUM`)
    pub check_num: Option<String>,
    /// Bank reference number (`REFNUM`)
    pub ref_num: Option<String>,
    /// Signed amount (`TRNAMT`)
    pub amount: Decimal,
    /// Posting date (`DTPOSTED`, date portion)
    pub posted: NaiveDate,
}

#[derive(Debug, Default)]
struct RecordBuilder {
    fitid: Option<String>,
    name: Option<String>,
    memo: Option<String>,
    payee_name: Option<String>,
    payee_state: Option<String>,
    has_payee: bool,
    check_num: Option<String>,
    ref_num: Option<String>,
    amount: Option<Decimal>,
    posted: Option<NaiveDate>,
}

impl RecordBuilder {
    fn build(self) -> Result<OfxRecord, ImportError> {
        let fitid = self
            .fitid
            .ok_or_else(|| ImportError::ofx_decode("transaction is missing FITID"))?;
        let amount = self.amount.ok_or_else(|| {
            ImportError::ofx_decode(format!("transaction {fitid} is missing TRNAMT"))
        })?;
        let posted = self.posted.ok_or_else(|| {
            ImportError::ofx_decode(format!("transaction {fitid} is missing DTPOSTED"))
        })?;

        let payee = if self.has_payee {
            self.payee_name.map(|name| OfxPayee {
                name,
                state: self.payee_state,
            })
        } else {
            None
        };

        Ok(OfxRecord {
            fitid,
            name: self.name,
            memo: self.memo,
            payee,
            check_num: self.check_num,
            ref_num: self.ref_num,
            amount,
            posted,
        })
    }
}

/// Decode an OFX document into its transaction records, in document order
///
/// # Errors
///
/// Returns `EmptyInput` for an empty document, and `OfxDecode` when a
/// transaction aggregate is missing a required field or carries a value
/// that does not parse. Any such failure aborts the whole decode.
pub fn decode(data: &[u8]) -> Result<Vec<OfxRecord>, ImportError> {
    if data.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let text = String::from_utf8_lossy(data);
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;
    let mut in_payee = false;

    for (tag, value) in TagIterator::new(&text) {
        match tag.as_str() {
            "STMTTRN" => {
                if current.is_some() {
                    return Err(ImportError::ofx_decode("nested STMTTRN aggregate"));
                }
                current = Some(RecordBuilder::default());
            }
            "/STMTTRN" => {
                let builder = current
                    .take()
                    .ok_or_else(|| ImportError::ofx_decode("unmatched /STMTTRN"))?;
                records.push(builder.build()?);
            }
            "PAYEE" => {
                if let Some(builder) = current.as_mut() {
                    builder.has_payee = true;
                    in_payee = true;
                }
            }
            "/PAYEE" => in_payee = false,
            _ => {
                if let Some(builder) = current.as_mut() {
                    assign_leaf(builder, &tag, value, in_payee)?;
                }
            }
        }
    }

    if current.is_some() {
        return Err(ImportError::ofx_decode("unterminated STMTTRN aggregate"));
    }

    Ok(records)
}

fn assign_leaf(
    builder: &mut RecordBuilder,
    tag: &str,
    value: &str,
    in_payee: bool,
) -> Result<(), ImportError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    match tag {
        "FITID" => builder.fitid = Some(value.to_string()),
        "NAME" if in_payee => builder.payee_name = Some(value.to_string()),
        "NAME" => builder.name = Some(value.to_string()),
        "STATE" if in_payee => builder.payee_state = Some(value.to_string()),
        "MEMO" => builder.memo = Some(value.to_string()),
        "CHECKNUM" => builder.check_num = Some(value.to_string()),
        "REFNUM" => builder.ref_num = Some(value.to_string()),
        "TRNAMT" => {
            let amount = Decimal::from_str(value).map_err(|e| {
                ImportError::ofx_decode(format!("invalid TRNAMT '{value}': {e}"))
            })?;
            builder.amount = Some(amount);
        }
        "DTPOSTED" => {
            // DTPOSTED may carry a time and timezone suffix; only the
            // YYYYMMDD date portion is meaningful here.
            let date_part = value.get(..8).ok_or_else(|| {
                ImportError::ofx_decode(format!("invalid DTPOSTED '{value}'"))
            })?;
            let posted = NaiveDate::parse_from_str(date_part, "%Y%m%d").map_err(|e| {
                ImportError::ofx_decode(format!("invalid DTPOSTED '{value}': {e}"))
            })?;
            builder.posted = Some(posted);
        }
        _ => {}
    }

    Ok(())
}

/// Iterator over `(tag, value)` pairs in an OFX tag stream
///
/// The value is the raw text between the end of a tag and the next `<`,
/// which for aggregate tags is whitespace and for leaf tags is the field
/// content.
struct TagIterator<'a> {
    text: &'a str,
}

impl<'a> TagIterator<'a> {
    fn new(text: &'a str) -> Self {
        TagIterator { text }
    }
}

impl<'a> Iterator for TagIterator<'a> {
    type Item = (String, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let open = self.text.find('<')?;
        let rest = &self.text[open + 1..];
        let close = rest.find('>')?;
        let tag = rest[..close].to_ascii_uppercase();

        let after = &rest[close + 1..];
        let value_end = after.find('<').unwrap_or(after.len());
        let value = &after[..value_end];

        self.text = after;
        Some((tag, value))
    }
}
