//! Constituency ordinals: splitting `"District N"` labels and ordering seats.
//!
//! Labels arrive as `"Jhapa 1"`, `"Jhapa-1"`, `"Jhapa – 1"`, `"Eastern Rukum 1"`
//! or `"झापा १"`. The district part must survive intact, including
//! multi-word names, and re-splitting an already-split name must be a no-op.

use std::sync::LazyLock;

use regex::Regex;

use crate::keys::ConstituencyKey;
use crate::normalize::{clean_text, normalize_district};

/// Sort position for seats whose ordinal could not be parsed.
pub const UNPARSED_ORDINAL: u32 = u32::MAX;

/// Trailing `[-\s]*<ascii digits>\s*` suffix. Dashes are already unified by
/// [`clean_text`].
static TRAILING_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]*[0-9]+\s*$").unwrap());

/// Parse a positive ordinal written in ASCII or Devanagari digits.
///
/// `"3"` → 3, `"३"` → 3, `" 12 "` → 12. Zero, empty, signed, and mixed input
/// yield `None`.
pub fn parse_ordinal(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for c in s.chars() {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '\u{0966}'..='\u{096F}' => c as u32 - 0x0966,
            _ => return None,
        };
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    (value > 0).then_some(value)
}

/// Split a combined constituency label into its district text and ordinal.
///
/// Strips a trailing numeric suffix (optionally dash-joined). If the regex
/// removes nothing, falls back to dropping the last whitespace token when it
/// parses as a number, which is how Devanagari numerals are handled. The
/// returned district text is cleaned but not yet normalized.
pub fn split_constituency(raw: &str) -> (String, Option<u32>) {
    let cleaned = clean_text(raw);

    if let Some(m) = TRAILING_ORDINAL.find(&cleaned) {
        let district = cleaned[..m.start()].trim();
        if !district.is_empty() {
            let digits = m.as_str().trim_matches(|c: char| c == '-' || c.is_whitespace());
            return (district.to_string(), parse_ordinal(digits));
        }
    }

    if let Some((head, last)) = cleaned.rsplit_once(' ')
        && let Some(ordinal) = parse_ordinal(last)
    {
        return (head.trim_end_matches('-').trim().to_string(), Some(ordinal));
    }

    (cleaned, None)
}

/// Resolve a combined label straight to a [`ConstituencyKey`]. `None` when
/// the label carries no usable ordinal.
pub fn constituency_key(raw: &str) -> Option<ConstituencyKey> {
    let (district, ordinal) = split_constituency(raw);
    let ordinal = ordinal?;
    Some(ConstituencyKey::new(normalize_district(&district), ordinal))
}

/// Ordinal used for display ordering; unparsed seats sort last.
pub fn sort_ordinal(ordinal: Option<u32>) -> u32 {
    ordinal.unwrap_or(UNPARSED_ORDINAL)
}
