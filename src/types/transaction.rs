//! Transaction types for the statement import pipeline
//!
//! A statement parser produces [`PendingTransaction`] values in statement
//! order. Classification (automatic or interactive) turns each one into a
//! [`Transaction`] by attaching the opposite account of the double entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A parsed statement record that has not been assigned an opposite account
///
/// Produced by a statement parser and immutable from then on. The `index`
/// is the 0-based position of the record in the original statement and is
/// unique within one imported batch; the ledger formatter relies on it to
/// reconstruct statement order after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    /// 0-based position in original statement order
    pub index: usize,

    /// Date the transaction was posted
    pub date: NaiveDate,

    /// Normalized merchant description, used as the classification key
    pub description: String,

    /// Signed amount at two-decimal precision
    ///
    /// Stored in ledger convention: spend is negative, regardless of the
    /// statement's own sign convention.
    pub amount: Decimal,

    /// Dedup key: the statement's own reference where it has one, otherwise
    /// a deterministic synthesized fallback
    pub reference: String,

    /// The statement's own account name
    pub account: String,

    /// Currency code for both postings
    pub commodity: String,
}

/// A transaction that has been assigned an opposite account
///
/// Created by the classifier (defaults hit) or by the review session
/// (operator decision). Every `Transaction` traces back to exactly one
/// input [`PendingTransaction`] through `pending.index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The statement record this transaction was built from
    pub pending: PendingTransaction,

    /// The counter-account the offsetting posting is made to
    pub opposite_account: String,
}

impl Transaction {
    /// Attach an opposite account to a pending transaction
    pub fn new(pending: PendingTransaction, opposite_account: impl Into<String>) -> Self {
        Transaction {
            pending,
            opposite_account: opposite_account.into(),
        }
    }
}
