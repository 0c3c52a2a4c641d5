//! Bank statement import library
//! # Overview
//!
//! This library turns a bank-exported statement into a plain-text
//! double-entry ledger: each raw record becomes a candidate transaction,
//! repeat merchants are classified automatically from a learned mapping,
//! and unseen merchants go through an interactive review step whose
//! decisions are journaled for crash recovery.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (PendingTransaction, Transaction, errors)
//! - [`cli`] - CLI argument parsing and the provider selector
//! - [`import`] - Statement parser variants behind one capability contract:
//!   - [`import::amex_csv`] - delimited-text statements, via the row lexer
//!   - [`import::ofx`] - structured-format statements, with reference synthesis
//! - [`core`] - Classification and review:
//!   - [`core::defaults`] - durable vendor-to-account mapping
//!   - [`core::classifier`] - auto/manual partitioning
//!   - [`core::session`] - crash-tolerant review decision log
//!   - [`core::engine`] - pipeline orchestration
//! - [`io`] - Ledger rendering and output
//!
//! # Pipeline
//!
//! Parse, classify (consulting the defaults store), review interactively
//! (misses only, mutating the defaults store), render in statement order,
//! write, canonicalize. Strictly sequential; the only other execution
//! context is the interrupt handler, which shares the defaults store
//! behind a mutex to flush it on shutdown.

// Module declarations
pub mod cli;
pub mod core;
pub mod import;
pub mod io;
pub mod types;

pub use crate::core::{classify, DefaultsStore, EngineConfig, ImportEngine, ReviewSession};
pub use crate::import::{create_importer, ImporterConfig, StatementImporter};
pub use crate::types::{ImportError, PendingTransaction, Transaction};
