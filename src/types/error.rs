//! Error types for the statement import pipeline
//!
//! Every failure the pipeline can hit is a variant of [`ImportError`] with
//! enough context to report it once, at the point it is surfaced.
//!
//! # Severity policy
//!
//! - Parse failures (`EmptyInput`, `HeaderMismatch`, `ParseError`,
//!   `MissingDescription`, `OfxDecode`) abort the whole import. There is no
//!   partial ledger.
//! - `DefaultsSave` during review is logged as a warning and the review loop
//!   continues; the same failure on the interrupt path is reported but does
//!   not prevent termination.
//! - `SessionDecode` applies to a single recovery-log line, which is logged
//!   and skipped.
//! - `InputRead`, `LedgerWrite` and `FormatterFailed` are fatal, the last
//!   one kept distinct so a canonicalizer failure is never mistaken for a
//!   failure to write the ledger itself.

use thiserror::Error;

/// Main error type for the import pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    /// The statement input was empty
    #[error("Empty input file")]
    EmptyInput,

    /// The first line of a delimited statement did not match the expected
    /// column header exactly
    #[error("Header mismatch, please check columns")]
    HeaderMismatch,

    /// A statement row could not be parsed
    ///
    /// Aborts the whole import; there is no partial success for a
    /// delimited statement.
    #[error("Could not parse statement row {row}: {message}")]
    ParseError {
        /// 0-based row position in the statement body
        row: usize,
        /// Description of the parse failure
        message: String,
    },

    /// A structured-format record had no usable description source
    #[error("No available description properties for FITID {fitid}")]
    MissingDescription {
        /// External transaction id of the offending record
        fitid: String,
    },

    /// The structured statement data could not be decoded into records
    #[error("Could not decode OFX statement: {message}")]
    OfxDecode {
        /// Description of the decode failure
        message: String,
    },

    /// An I/O operation failed
    #[error("{context}: {message}")]
    Io {
        /// What the pipeline was doing when the failure occurred
        context: String,
        /// Description of the underlying I/O error
        message: String,
    },

    /// The defaults file existed but could not be read or parsed
    #[error("Could not load defaults: {message}")]
    DefaultsLoad { message: String },

    /// The defaults store could not be persisted
    #[error("Could not save defaults: {message}")]
    DefaultsSave { message: String },

    /// A single review-session log line could not be decoded
    #[error("Could not decode session entry: {message}")]
    SessionDecode { message: String },

    /// Reading an interactive answer from the operator failed
    #[error("Could not read operator input: {message}")]
    InputRead { message: String },

    /// Writing the final ledger output failed
    #[error("Could not write ledger: {message}")]
    LedgerWrite { message: String },

    /// The external ledger canonicalizer failed after a successful write
    #[error("Formatting failed: {message}")]
    FormatterFailed { message: String },
}

impl From<std::io::Error> for ImportError {
    fn from(error: std::io::Error) -> Self {
        ImportError::Io {
            context: "I/O error".to_string(),
            message: error.to_string(),
        }
    }
}

impl ImportError {
    /// Create a ParseError for a statement row
    pub fn parse(row: usize, message: impl Into<String>) -> Self {
        ImportError::ParseError {
            row,
            message: message.into(),
        }
    }

    /// Create a MissingDescription error
    pub fn missing_description(fitid: impl Into<String>) -> Self {
        ImportError::MissingDescription {
            fitid: fitid.into(),
        }
    }

    /// Create an OfxDecode error
    pub fn ofx_decode(message: impl Into<String>) -> Self {
        ImportError::OfxDecode {
            message: message.into(),
        }
    }

    /// Create an Io error with context describing the failed operation
    pub fn io(context: impl Into<String>, error: std::io::Error) -> Self {
        ImportError::Io {
            context: context.into(),
            message: error.to_string(),
        }
    }

    /// Create a DefaultsLoad error
    pub fn defaults_load(message: impl ToString) -> Self {
        ImportError::DefaultsLoad {
            message: message.to_string(),
        }
    }

    /// Create a DefaultsSave error
    pub fn defaults_save(message: impl ToString) -> Self {
        ImportError::DefaultsSave {
            message: message.to_string(),
        }
    }

    /// Create a SessionDecode error
    pub fn session_decode(message: impl Into<String>) -> Self {
        ImportError::SessionDecode {
            message: message.into(),
        }
    }

    /// Create an InputRead error
    pub fn input_read(message: impl ToString) -> Self {
        ImportError::InputRead {
            message: message.to_string(),
        }
    }

    /// Create a LedgerWrite error
    pub fn ledger_write(message: impl ToString) -> Self {
        ImportError::LedgerWrite {
            message: message.to_string(),
        }
    }

    /// Create a FormatterFailed error
    pub fn formatter_failed(message: impl ToString) -> Self {
        ImportError::FormatterFailed {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty_input(ImportError::EmptyInput, "Empty input file")]
    #[case::header_mismatch(
        ImportError::HeaderMismatch,
        "Header mismatch, please check columns"
    )]
    #[case::parse_error(
        ImportError::parse(3, "invalid date '32/13/2024'"),
        "Could not parse statement row 3: invalid date '32/13/2024'"
    )]
    #[case::missing_description(
        ImportError::missing_description("TX-9001"),
        "No available description properties for FITID TX-9001"
    )]
    #[case::io_with_context(
        ImportError::Io {
            context: "could not read input file 'amex.csv'".to_string(),
            message: "No such file or directory".to_string(),
        },
        "could not read input file 'amex.csv': No such file or directory"
    )]
    #[case::defaults_save(
        ImportError::defaults_save("Permission denied"),
        "Could not save defaults: Permission denied"
    )]
    #[case::session_decode(
        ImportError::session_decode("mismatched session version"),
        "Could not decode session entry: mismatched session version"
    )]
    #[case::formatter_failed(
        ImportError::formatter_failed("bean-format exited with exit status: 1"),
        "Formatting failed: bean-format exited with exit status: 1"
    )]
    fn test_error_display(#[case] error: ImportError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: ImportError = io_error.into();
        assert!(matches!(error, ImportError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
