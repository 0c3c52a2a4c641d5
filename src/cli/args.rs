use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Import a bank statement into a plain-text double-entry ledger
#[derive(Parser, Debug)]
#[command(name = "ledger-import")]
#[command(
    about = "Import bank statements into a plain-text ledger",
    long_about = None
)]
pub struct CliArgs {
    /// Statement provider that produced the input file
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Provider,

    /// Path to the statement export to import
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// The name of the statement's account
    #[arg(long, value_name = "ACCOUNT")]
    pub account: String,

    /// Commodity (currency code) for every posting
    #[arg(long, value_name = "CODE", default_value = "AUD")]
    pub commodity: String,

    /// Ledger output path (defaults to the input path with `.ledger` appended)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Learned vendor defaults file
    #[arg(long, value_name = "FILE", default_value = "ledger-import.yaml")]
    pub defaults: PathBuf,

    /// Resume an interrupted review session from its recovery log
    #[arg(long)]
    pub resume: bool,
}

/// Supported statement providers
///
/// Selecting a provider picks the statement parser variant; see
/// [`crate::import::create_importer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Delimited-text AMEX export
    #[value(name = "amexcsv")]
    AmexCsv,
    /// OFX statement export
    #[value(name = "ofx")]
    Ofx,
}

impl CliArgs {
    /// Resolve the ledger output path
    ///
    /// Uses `--output` when given, otherwise the input path with a
    /// `.ledger` suffix appended.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let mut name = self.input.as_os_str().to_owned();
                name.push(".ledger");
                PathBuf::from(name)
            }
        }
    }
}
