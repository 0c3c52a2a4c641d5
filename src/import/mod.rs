//! Statement import module
//!
//! This module defines the capability contract every statement parser
//! variant implements, and a factory that selects the variant from the
//! enumerated provider type chosen on the command line. Adding a bank
//! format means adding a variant here, not string comparisons in control
//! flow.
//!
//! # Components
//!
//! - `amex_csv` - delimited-text statement parser
//! - `row_lexer` - row reassembly for the delimited format
//! - `ofx` - structured-format statement parser
//! - `ofx_decode` - OFX tag-stream decoder feeding the `ofx` parser

use crate::cli::Provider;
use crate::types::{ImportError, PendingTransaction};

pub mod amex_csv;
pub mod ofx;
pub mod ofx_decode;
pub mod row_lexer;

pub use amex_csv::{AmexCsvImporter, AMEX_HEADER};
pub use ofx::{fallback_reference, OfxImporter};

/// Per-run configuration shared by every importer variant
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// The statement's own account name, attached to every transaction
    pub account: String,
    /// Currency code attached to every transaction
    pub commodity: String,
}

/// Capability contract for statement parser variants
///
/// An importer turns raw statement bytes into the ordered sequence of
/// pending transactions, or fails the whole import. Implementations are
/// all-or-nothing; none of them produce a partial batch.
pub trait StatementImporter {
    /// Parse the statement into pending transactions
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PendingTransaction>)` with `index` running 0..n-1 in
    ///   statement order
    /// * `Err(ImportError)` if any part of the statement fails to parse
    fn import(&self) -> Result<Vec<PendingTransaction>, ImportError>;
}

/// Create the importer for the selected provider
///
/// This factory instantiates the statement parser variant matching the
/// provider chosen at the CLI, handing it the raw statement bytes and the
/// per-run configuration.
pub fn create_importer(
    provider: Provider,
    data: Vec<u8>,
    config: ImporterConfig,
) -> Box<dyn StatementImporter> {
    match provider {
        Provider::AmexCsv => Box::new(AmexCsvImporter::new(data, config)),
        Provider::Ofx => Box::new(OfxImporter::new(data, config)),
    }
}
