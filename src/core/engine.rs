//! Import pipeline orchestration
//!
//! The engine owns one run of the strictly sequential pipeline:
//! import, session replay (when resuming), classification, interactive
//! review, ledger rendering, batch write, and the external canonicalizer.
//! It coordinates the importer, the defaults store, the review session
//! log and the ledger formatter without doing any of their work itself.
//!
//! Operator interaction goes through an injected reader and writer rather
//! than touching stdin/stdout directly, so the whole pipeline, review
//! included, is drivable from tests.
//!
//! The defaults store is shared behind a mutex with the process interrupt
//! handler: the handler's shutdown flush can only run between the
//! engine's own store operations, never halfway through one.

use crate::core::classifier::{classify, VendorQueue};
use crate::core::defaults::DefaultsStore;
use crate::core::session::ReviewSession;
use crate::import::StatementImporter;
use crate::io::ledger_format::{render_ledger, render_pending, run_formatter, write_ledger};
use crate::types::{ImportError, Transaction};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Per-run engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the assembled ledger is written
    pub output_path: PathBuf,
    /// Replay the review session log before classifying
    pub resume: bool,
    /// External canonicalizer to run on the written ledger, if any
    pub format_command: Option<String>,
}

/// One run of the import pipeline
pub struct ImportEngine {
    config: EngineConfig,
    importer: Box<dyn StatementImporter>,
    defaults: Arc<Mutex<DefaultsStore>>,
}

impl ImportEngine {
    /// Create an engine for one run
    pub fn new(
        config: EngineConfig,
        importer: Box<dyn StatementImporter>,
        defaults: Arc<Mutex<DefaultsStore>>,
    ) -> Self {
        ImportEngine {
            config,
            importer,
            defaults,
        }
    }

    /// Run the pipeline to completion
    ///
    /// `input` supplies operator answers during review; `output` receives
    /// progress messages and prompts. The ledger itself goes to the
    /// configured output path, not to `output`.
    ///
    /// # Errors
    ///
    /// Any import failure, an operator input-read failure, a ledger write
    /// failure, or a canonicalizer failure aborts the run. A failure to
    /// persist the defaults store mid-review does not; it is logged as a
    /// warning and the review continues.
    pub fn run(&self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<(), ImportError> {
        let imported = self.importer.import()?;
        writeln!(output, "Found {} transactions.", imported.len())?;

        let mut session = ReviewSession::open(&self.config.output_path)?;
        let mut pending = imported;
        let mut complete: Vec<Transaction> = Vec::new();

        if self.config.resume {
            // Entries recovered from the log are already finalized; they
            // are matched to this import by reference and excluded from
            // classification so no vendor is asked about twice.
            let entries = session.replay()?;
            for entry in entries {
                match pending
                    .iter()
                    .position(|txn| txn.reference == entry.reference)
                {
                    Some(pos) => {
                        let txn = pending.remove(pos);
                        complete.push(Transaction::new(txn, entry.opposite_account));
                    }
                    None => warn!(
                        reference = %entry.reference,
                        "session entry matches no imported transaction, dropping"
                    ),
                }
            }
            writeln!(
                output,
                "Recovered {} transactions from a previous session.",
                complete.len()
            )?;
        }

        let classification = {
            let defaults = lock(&self.defaults);
            classify(pending, &defaults)
        };
        writeln!(
            output,
            "Automatically identified {} transactions.",
            classification.auto.len()
        )?;
        complete.extend(classification.auto);

        if !classification.manual.is_empty() {
            self.review(classification.manual, &mut complete, &mut session, input, output)?;
        }

        writeln!(
            output,
            "Outputting {} transactions to the ledger.",
            complete.len()
        )?;
        let ledger = render_ledger(&mut complete);
        write_ledger(&self.config.output_path, &ledger)?;

        // The ledger now holds every decision, so the recovery log has
        // done its job.
        if let Err(e) = session.clear() {
            warn!(error = %e, "could not remove session log");
        }

        if let Some(command) = &self.config.format_command {
            writeln!(
                output,
                "Running {} {}",
                command,
                self.config.output_path.display()
            )?;
            run_formatter(command, &self.config.output_path)?;
        }

        if let Err(e) = lock(&self.defaults).persist() {
            warn!(error = %e, "could not save defaults at shutdown");
        }

        writeln!(output, "Finished!")?;
        Ok(())
    }

    /// Interactive manual attribution of unresolved vendors
    ///
    /// One decision unit per vendor: all of the vendor's transactions are
    /// shown and a single account answer resolves every one of them. Each
    /// decision is made durable twice before the loop moves on, first in
    /// the defaults store, then in the session log.
    fn review(
        &self,
        manual: Vec<VendorQueue>,
        complete: &mut Vec<Transaction>,
        session: &mut ReviewSession,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), ImportError> {
        writeln!(
            output,
            "{} vendor(s) requiring manual attribution.",
            manual.len()
        )?;
        write!(output, "Press return to begin...")?;
        output.flush()?;
        read_line(input)?;

        let total = manual.len();
        for (idx, queue) in manual.into_iter().enumerate() {
            writeln!(output, "\n{}/{}: \"{}\"", idx + 1, total, queue.vendor)?;
            for txn in &queue.transactions {
                writeln!(output, "\n{}", render_pending(txn))?;
            }
            writeln!(output)?;
            write!(output, "Assign to Account: ")?;
            output.flush()?;

            let account = read_line(input)?;

            {
                let mut defaults = lock(&self.defaults);
                defaults.save_vendor(&queue.vendor, &account);
                if let Err(e) = defaults.persist() {
                    warn!(error = %e, "could not save vendor to defaults file");
                }
            }

            for txn in queue.transactions {
                let finalized = Transaction::new(txn, account.clone());
                if let Err(e) = session.record(&finalized) {
                    warn!(error = %e, "could not record decision in session log");
                }
                complete.push(finalized);
            }
        }

        Ok(())
    }
}

/// Read one operator answer
///
/// End of input counts as a read failure: review cannot proceed without
/// an answer and there is no default.
fn read_line(input: &mut dyn BufRead) -> Result<String, ImportError> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(ImportError::input_read)?;
    if read == 0 {
        return Err(ImportError::input_read("unexpected end of input"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn lock(defaults: &Mutex<DefaultsStore>) -> std::sync::MutexGuard<'_, DefaultsStore> {
    defaults.lock().unwrap_or_else(PoisonError::into_inner)
}
