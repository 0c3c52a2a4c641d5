//! Row lexer for delimited statement exports
//!
//! Statement rows cannot be recovered by splitting on newlines: free-text
//! fields carry embedded raw newlines, tabs and quoted commas. The lexer
//! makes a single forward pass over the statement body and reassembles one
//! single-line row per logical record.
//!
//! The lexer runs as a small state machine. While `ScanningField` it copies
//! bytes through; a quote character toggles it into `InsideQuotedField`
//! (the quote itself is dropped); a newline puts it at a row-boundary
//! candidate, resolved by [`is_row_boundary`] over a bounded lookahead
//! window.
//!
//! Per-byte rules:
//! - a newline followed by a date-prefix pattern starts a new row
//! - any other newline or tab becomes a single space, keeping rows single-line
//! - apostrophes are dropped (source-data artifact)
//! - quotes toggle the quoted state and are dropped
//! - commas inside a quoted field are dropped, collapsing the field

/// Bytes of lookahead needed to recognize a row boundary: `DD/MM/YYYY,`
const BOUNDARY_WINDOW: usize = 11;

/// Lexer states for the forward pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Copying field bytes through to the current row
    ScanningField,
    /// Between a pair of quote characters; commas are not meaningful here
    InsideQuotedField,
}

/// Row-boundary predicate
///
/// Decides whether the bytes immediately following a newline open a new
/// statement row. `window` is the bounded lookahead starting at the byte
/// after the newline; a genuine row opens with a date: two digits, `/`,
/// two digits, `/`, and the field-separating comma at the expected offset
/// after the four-digit year.
pub(crate) fn is_row_boundary(window: &[u8]) -> bool {
    if window.len() < BOUNDARY_WINDOW {
        return false;
    }
    window[0].is_ascii_digit()
        && window[1].is_ascii_digit()
        && window[2] == b'/'
        && window[3].is_ascii_digit()
        && window[4].is_ascii_digit()
        && window[5] == b'/'
        && window[10] == b','
}

/// Reassemble the statement body into single-line rows
///
/// `data` is the raw statement bytes with the header line already removed.
/// Returns the rows in statement order; the caller splits each row into
/// positional fields. A trailing newline at end of input terminates the
/// final row rather than turning into a trailing space.
pub(crate) fn lex_rows(data: &[u8]) -> Vec<String> {
    let mut rows: Vec<Vec<u8>> = vec![Vec::new()];
    let mut state = LexState::ScanningField;

    for (pos, &byte) in data.iter().enumerate() {
        match byte {
            b'\n' => {
                let end = (pos + 1 + BOUNDARY_WINDOW).min(data.len());
                if is_row_boundary(&data[pos + 1..end]) {
                    rows.push(Vec::new());
                } else if pos + 1 < data.len() {
                    push_byte(&mut rows, b' ');
                }
            }
            b'\t' => push_byte(&mut rows, b' '),
            b'\'' => {}
            b'"' => {
                state = match state {
                    LexState::ScanningField => LexState::InsideQuotedField,
                    LexState::InsideQuotedField => LexState::ScanningField,
                };
            }
            b',' if state == LexState::InsideQuotedField => {}
            _ => push_byte(&mut rows, byte),
        }
    }

    rows.into_iter()
        .map(|row| String::from_utf8_lossy(&row).into_owned())
        .collect()
}

fn push_byte(rows: &mut [Vec<u8>], byte: u8) {
    if let Some(row) = rows.last_mut() {
        row.push(byte);
    }
}
