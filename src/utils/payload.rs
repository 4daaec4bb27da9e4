//! Directory payload parsing.
//!
//! The upstream format varies: a raw JSON array of entries, or a script that
//! assigns the array to a well-known global (`bangs = [...]`). The script
//! form is handled by structural extraction of the assigned array literal;
//! no payload code ever runs.

use crate::domain::entities::BangEntry;
use crate::domain::error::DirectoryError;

/// Errors that can occur while extracting entries from a payload body.
#[derive(Debug, thiserror::Error)]
pub enum PayloadParseError {
    #[error("no array literal found in payload")]
    NoArrayLiteral,

    #[error("unterminated array literal in payload")]
    UnterminatedArray,

    #[error("array literal is not a valid entry list: {0}")]
    InvalidEntries(String),

    #[error("payload parsed to an empty directory")]
    EmptyDirectory,
}

impl From<PayloadParseError> for DirectoryError {
    fn from(e: PayloadParseError) -> Self {
        Self::PayloadUnparseable(e.to_string())
    }
}

/// Parses a directory payload into its entry list.
///
/// Accepts either a bare JSON array or a script performing a single
/// assignment of that array to a global. Extraction isolates the array
/// literal textually; anything else in the script is ignored, never
/// executed. A payload that parses to zero entries is rejected so the
/// caller's fallback chain keeps a usable directory.
pub fn parse_directory_payload(body: &str) -> Result<Vec<BangEntry>, PayloadParseError> {
    let literal = extract_array_literal(body)?;

    let entries: Vec<BangEntry> = serde_json::from_str(literal)
        .map_err(|e| PayloadParseError::InvalidEntries(e.to_string()))?;

    if entries.is_empty() {
        return Err(PayloadParseError::EmptyDirectory);
    }

    Ok(entries)
}

/// Locates the array literal inside `body`.
///
/// A body that already starts with `[` is taken as a bare JSON array. In the
/// script form, scanning starts after the first assignment `=` (one that is
/// not part of `==`, `!=`, `<=` or `>=`), so bracketed assignment targets
/// like `window["bangs"]` are skipped.
fn extract_array_literal(body: &str) -> Result<&str, PayloadParseError> {
    let trimmed = body.trim();
    let search_from = if trimmed.starts_with('[') {
        0
    } else {
        find_assignment(trimmed).map_or(0, |position| position + 1)
    };

    let open = trimmed[search_from..]
        .find('[')
        .map(|offset| search_from + offset)
        .ok_or(PayloadParseError::NoArrayLiteral)?;

    let close = find_matching_bracket(trimmed, open).ok_or(PayloadParseError::UnterminatedArray)?;

    Ok(&trimmed[open..=close])
}

/// Byte offset of the first single `=` in `text`, if any.
fn find_assignment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (position, &byte) in bytes.iter().enumerate() {
        if byte != b'=' {
            continue;
        }
        let prev = position.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(position + 1).copied();
        if prev != Some(b'=')
            && next != Some(b'=')
            && !matches!(prev, Some(b'!') | Some(b'<') | Some(b'>'))
        {
            return Some(position);
        }
    }
    None
}

/// Walks from the `[` at `open` to its matching `]`, tracking bracket depth
/// and skipping over string literals (single or double quoted, with escape
/// handling) so brackets inside entry values do not unbalance the scan.
fn find_matching_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for position in open..bytes.len() {
        let byte = bytes[position];

        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == quote {
                in_string = None;
            }
            continue;
        }

        match byte {
            b'"' | b'\'' => in_string = Some(byte),
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(position);
                }
            }
            _ => {}
        }
    }

    None
}
