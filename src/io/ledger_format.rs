//! Ledger rendering and output
//!
//! Renders finalized transactions back into statement order as plain-text
//! double-entry records and writes the assembled ledger in one batch at
//! the end of a successful run. The external canonicalizer is invoked on
//! the written file afterwards; its failure is reported distinctly from a
//! failure to write.
//!
//! # Record shape
//!
//! ```text
//! 2024-02-01 * "COFFEE SHOP REF:REF001"
//!     Assets:Bank     -12.50 AUD
//!     Expenses:Food   12.50 AUD
//! ```
//!
//! The statement account posts the stored signed amount and the opposite
//! account posts its exact negation, both at two-decimal precision.

use crate::types::{ImportError, PendingTransaction, Transaction};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Render one finalized transaction as a ledger record
pub fn render_transaction(txn: &Transaction) -> String {
    format!(
        "{} * \"{} REF:{}\"\n\t{}\t{:.2} {}\n\t{}\t{:.2} {}\n\n",
        txn.pending.date.format("%Y-%m-%d"),
        txn.pending.description,
        txn.pending.reference,
        txn.pending.account,
        txn.pending.amount,
        txn.pending.commodity,
        txn.opposite_account,
        -txn.pending.amount,
        txn.pending.commodity,
    )
}

/// Render a pending transaction with a placeholder opposite account
///
/// Shown to the operator during review, before an account is assigned.
pub fn render_pending(txn: &PendingTransaction) -> String {
    format!(
        "{} * \"{} REF:{}\"\n\t{}\t{:.2} {}\n\t{{}}\t{:.2} {}",
        txn.date.format("%Y-%m-%d"),
        txn.description,
        txn.reference,
        txn.account,
        txn.amount,
        txn.commodity,
        -txn.amount,
        txn.commodity,
    )
}

/// Render the full ledger in statement order
///
/// Re-sorts the transactions by original statement index first, so output
/// order matches the source statement regardless of which classification
/// path resolved each record.
pub fn render_ledger(transactions: &mut [Transaction]) -> String {
    transactions.sort_by_key(|txn| txn.pending.index);
    transactions.iter().map(render_transaction).collect()
}

/// Write the assembled ledger to the output path in one batch
pub fn write_ledger(path: &Path, ledger: &str) -> Result<(), ImportError> {
    fs::write(path, ledger).map_err(ImportError::ledger_write)
}

/// Run the external ledger canonicalizer against the output path
///
/// # Errors
///
/// `FormatterFailed` when the command cannot be spawned or exits
/// non-zero. By this point the ledger is already on disk; the distinct
/// variant keeps that fact visible to the operator.
pub fn run_formatter(command: &str, path: &Path) -> Result<(), ImportError> {
    let status = Command::new(command)
        .arg(path)
        .status()
        .map_err(ImportError::formatter_failed)?;

    if !status.success() {
        return Err(ImportError::formatter_failed(format!(
            "{command} exited with {status}"
        )));
    }
    Ok(())
}
