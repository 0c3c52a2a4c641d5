//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Pending and finalized transaction types
//! - `error`: Error types for the import pipeline

pub mod error;
pub mod transaction;

pub use error::ImportError;
pub use transaction::{PendingTransaction, Transaction};
