//! I/O module
//!
//! Handles ledger rendering and output.
//!
//! # Components
//!
//! - `ledger_format` - double-entry record rendering, batch write, and
//!   the external canonicalizer invocation

pub mod ledger_format;

pub use ledger_format::{
    render_ledger, render_pending, render_transaction, run_formatter, write_ledger,
};
