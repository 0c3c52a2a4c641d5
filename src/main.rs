//! Bank statement import CLI
//!
//! Command-line interface for importing bank statement exports into a
//! plain-text double-entry ledger.
//!
//! # Usage
//!
//! ```bash
//! ledger-import --provider amexcsv --input amex.csv --account Assets:Bank
//! ledger-import --provider ofx --input statement.ofx --account Assets:Bank \
//!     --commodity AUD --output finances.ledger --resume
//! ```
//!
//! The program parses the statement, classifies repeat merchants from the
//! defaults file, asks about the rest interactively, and writes the ledger
//! in statement order before running `bean-format` on it.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, malformed statement, write failure, etc.)

use ledger_import::cli::{self, CliArgs};
use ledger_import::core::{DefaultsStore, EngineConfig, ImportEngine};
use ledger_import::import::{create_importer, ImporterConfig};
use ledger_import::types::ImportError;
use std::fs;
use std::io;
use std::process;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::EnvFilter;

/// External command run against the written ledger
const FORMAT_COMMAND: &str = "bean-format";

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), ImportError> {
    let data = fs::read(&args.input).map_err(|e| {
        ImportError::io(
            format!("could not read input file '{}'", args.input.display()),
            e,
        )
    })?;

    let defaults = Arc::new(Mutex::new(DefaultsStore::load(&args.defaults)?));
    setup_interrupt_handler(Arc::clone(&defaults));

    let importer = create_importer(
        args.provider,
        data,
        ImporterConfig {
            account: args.account.clone(),
            commodity: args.commodity.clone(),
        },
    );

    let engine = ImportEngine::new(
        EngineConfig {
            output_path: args.output_path(),
            resume: args.resume,
            format_command: Some(FORMAT_COMMAND.to_string()),
        },
        importer,
        defaults,
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    engine.run(&mut input, &mut output)
}

/// Flush the defaults store on interrupt, wherever the pipeline is
///
/// The handler runs on its own thread; the mutex makes it wait out any
/// in-flight store operation before flushing. The flush is best-effort:
/// a failure is reported and the process still terminates, nonzero.
fn setup_interrupt_handler(defaults: Arc<Mutex<DefaultsStore>>) {
    let result = ctrlc::set_handler(move || {
        eprintln!("\nInterrupted, saving defaults");
        let store = defaults.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.persist() {
            eprintln!("Could not safely exit: {}", e);
            process::exit(1);
        }
        eprintln!("Safely exited. Bye!");
        process::exit(0);
    });

    if let Err(e) = result {
        eprintln!("Error: could not install interrupt handler: {}", e);
        process::exit(1);
    }
}
