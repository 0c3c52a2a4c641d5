//! Crash-tolerant review session log
//!
//! Every decision made during interactive review is appended to a log
//! colocated with the ledger output path, so a run interrupted mid-review
//! does not lose the operator's work: a subsequent run with `--resume`
//! replays the log and skips the vendors already resolved.
//!
//! Each entry is one line: the base64 encoding (standard alphabet, no
//! padding) of a versioned, tab-separated record:
//!
//! ```text
//! v1 <date> <description> <amount> <reference> <account> <opposite account>
//! ```
//!
//! Decoding tolerates partial corruption from an unclean shutdown: a line
//! that fails to decode is logged and skipped, never fatal. The log is
//! removed only after a full successful ledger write.

use crate::types::{ImportError, Transaction};
use base64::engine::general_purpose::STANDARD_NO_PAD as BASE64;
use base64::Engine as _;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Version tag every session line opens with
const SESSION_VERSION: &str = "v1";
const FIELD_COUNT: usize = 7;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A decoded session-log entry
///
/// Carries only what replay needs: the reference to match against the
/// freshly imported batch, and the opposite account the operator chose.
/// The remaining fields exist for operator inspection of the raw log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub reference: String,
    pub account: String,
    pub opposite_account: String,
}

/// Append-only decision log for one review run
#[derive(Debug)]
pub struct ReviewSession {
    path: PathBuf,
    file: File,
}

impl ReviewSession {
    /// Open (creating if needed) the session log for a ledger output path
    ///
    /// The log lives next to the ledger it protects, at the ledger path
    /// with `.session` appended.
    pub fn open(ledger_path: &Path) -> Result<Self, ImportError> {
        let path = session_path(ledger_path);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                ImportError::io(
                    format!("could not open session log '{}'", path.display()),
                    e,
                )
            })?;
        Ok(ReviewSession { path, file })
    }

    /// Read back the entries recorded by an earlier interrupted run
    ///
    /// Lines that fail to decode are logged and skipped so a torn final
    /// write cannot block recovery of the decisions before it.
    pub fn replay(&self) -> Result<Vec<SessionEntry>, ImportError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ImportError::io(
                format!("could not read session log '{}'", self.path.display()),
                e,
            )
        })?;

        let mut entries = Vec::new();
        for line in contents.lines().filter(|line| !line.is_empty()) {
            match decode_line(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "skipping session entry"),
            }
        }
        Ok(entries)
    }

    /// Append a finalized transaction to the log
    pub fn record(&mut self, txn: &Transaction) -> Result<(), ImportError> {
        let line = encode_line(txn);
        writeln!(self.file, "{line}").map_err(|e| {
            ImportError::io(
                format!("could not append to session log '{}'", self.path.display()),
                e,
            )
        })
    }

    /// Remove the log
    ///
    /// Called only once the ledger has been fully written; until then the
    /// log is the sole durable copy of the operator's manual decisions.
    pub fn clear(self) -> Result<(), ImportError> {
        fs::remove_file(&self.path).map_err(|e| {
            ImportError::io(
                format!("could not remove session log '{}'", self.path.display()),
                e,
            )
        })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn session_path(ledger_path: &Path) -> PathBuf {
    let mut name = ledger_path.as_os_str().to_owned();
    name.push(".session");
    PathBuf::from(name)
}

pub(crate) fn encode_line(txn: &Transaction) -> String {
    let raw = format!(
        "{}\t{}\t{}\t{:.2}\t{}\t{}\t{}",
        SESSION_VERSION,
        txn.pending.date.format(DATE_FORMAT),
        txn.pending.description,
        txn.pending.amount,
        txn.pending.reference,
        txn.pending.account,
        txn.opposite_account,
    );
    BASE64.encode(raw.as_bytes())
}

pub(crate) fn decode_line(line: &str) -> Result<SessionEntry, ImportError> {
    let decoded = BASE64
        .decode(line.trim())
        .map_err(|e| ImportError::session_decode(format!("invalid base64: {e}")))?;
    let raw = String::from_utf8(decoded)
        .map_err(|e| ImportError::session_decode(format!("invalid utf-8: {e}")))?;

    let parts: Vec<&str> = raw.split('\t').collect();
    if parts.len() != FIELD_COUNT {
        return Err(ImportError::session_decode(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            parts.len()
        )));
    }
    if parts[0] != SESSION_VERSION {
        return Err(ImportError::session_decode("mismatched session version"));
    }

    let date = NaiveDate::parse_from_str(parts[1], DATE_FORMAT)
        .map_err(|e| ImportError::session_decode(format!("invalid date '{}': {}", parts[1], e)))?;
    let amount = Decimal::from_str(parts[3]).map_err(|e| {
        ImportError::session_decode(format!("invalid amount '{}': {}", parts[3], e))
    })?;

    Ok(SessionEntry {
        date,
        description: parts[2].to_string(),
        amount,
        reference: parts[4].to_string(),
        account: parts[5].to_string(),
        opposite_account: parts[6].to_string(),
    })
}
