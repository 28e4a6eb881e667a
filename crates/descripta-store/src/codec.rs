//! Encodings of secondary-index values.
//!
//! # Formats
//!
//! | Index | Value | Example |
//! |-------|-------|---------|
//! | name | ASCII decimal ordinal | `42` |
//! | content key | bracketed list of ordinals | `[3, 7, 9]` |
//!
//! Content-key values are parsed by a strict grammar, never evaluated:
//!
//! ```text
//! set   := ws open ws ( int ( ws "," ws int )* ( ws "," )? )? ws close ws
//! open  := "[" | "("        close must match open
//! int   := [0-9]+
//! ```
//!
//! The tuple form is accepted because older builds stored tuples.

use std::collections::BTreeSet;

use crate::error::{StoreError, StoreResult};

/// Encode a name-index value.
pub fn encode_ordinal(ordinal: usize) -> String {
    ordinal.to_string()
}

/// Decode a name-index value.
///
/// # Errors
/// - `StoreError::DataCorruption` unless the value is a plain decimal that fits `usize`
pub fn decode_ordinal(location: &str, raw: &[u8]) -> StoreResult<usize> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| StoreError::corruption(location, format!("value is not UTF-8: {}", e)))?;
    let digits = text.trim_matches(|c: char| c.is_ascii_whitespace());
    parse_decimal(digits).ok_or_else(|| {
        StoreError::corruption(location, format!("expected an ordinal, found {:?}", text))
    })
}

/// Encode a content-key value. Ordinals are written in ascending order.
pub fn encode_ordinal_set<'a, I>(ordinals: I) -> String
where
    I: IntoIterator<Item = &'a usize>,
{
    let sorted: BTreeSet<usize> = ordinals.into_iter().copied().collect();
    let body: Vec<String> = sorted.iter().map(usize::to_string).collect();
    format!("[{}]", body.join(", "))
}

/// Decode a content-key value into its ordinal set.
///
/// # Errors
/// - `StoreError::DataCorruption` on any deviation from the grammar
pub fn decode_ordinal_set(location: &str, raw: &[u8]) -> StoreResult<BTreeSet<usize>> {
    let corrupt = |details: String| StoreError::corruption(location, details);

    let text = std::str::from_utf8(raw)
        .map_err(|e| corrupt(format!("value is not UTF-8: {}", e)))?;
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());

    let inner = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('['), Some(']')) | (Some('('), Some(')')) if trimmed.len() >= 2 => {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => return Err(corrupt(format!("expected a bracketed ordinal list, found {:?}", text))),
    };

    let mut ordinals = BTreeSet::new();
    let mut elements: Vec<&str> = inner.split(',').collect();
    if elements.len() == 1 && is_blank(elements[0]) {
        return Ok(ordinals);
    }
    // one trailing comma is allowed: "(3,)"
    if elements.len() > 1 && elements.last().is_some_and(|e| is_blank(e)) {
        elements.pop();
    }
    for element in elements {
        let digits = element.trim_matches(|c: char| c.is_ascii_whitespace());
        let ordinal = parse_decimal(digits)
            .ok_or_else(|| corrupt(format!("invalid ordinal {:?} in {:?}", element, text)))?;
        ordinals.insert(ordinal);
    }
    Ok(ordinals)
}

/// Reject ordinals outside `[0, len)`: the index disagrees with the data.
pub(crate) fn check_bounds(location: &str, ordinal: usize, len: usize) -> StoreResult<usize> {
    if ordinal < len {
        Ok(ordinal)
    } else {
        Err(StoreError::corruption(
            location,
            format!("ordinal {} outside store of {} rows", ordinal, len),
        ))
    }
}

fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_whitespace())
}

fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
