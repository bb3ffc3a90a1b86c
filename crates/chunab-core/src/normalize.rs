//! Name normalizer: raw source strings to canonical keys.
//!
//! Every function here is total. Unrecognised districts pass through as their
//! cleaned text, and unrecognised parties land in [`PartyKey::Others`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::keys::{DistrictKey, PartyKey};
use crate::tables::{CANONICAL_DISTRICTS, DISTRICT_ALIASES, NATIVE_DISTRICTS, PARTY_RULES};

/// Substrings that only appear when UTF-8 Devanagari (or accented Latin) was
/// decoded as Latin-1 somewhere upstream.
const MOJIBAKE_MARKERS: &[&str] = &["à¤", "à¥", "Ã"];

/// Dash glyphs unified to ASCII `-`.
const DASHES: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
    '\u{FE63}', '\u{FF0D}',
];

static NATIVE_LOOKUP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| NATIVE_DISTRICTS.iter().copied().collect());

/// Lowercase alias → canonical. Seeded with every canonical name so that
/// case variants of an English name also resolve.
static ALIAS_LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map: HashMap<String, &'static str> = CANONICAL_DISTRICTS
        .iter()
        .map(|(name, _)| (name.to_lowercase(), *name))
        .collect();
    map.extend(
        DISTRICT_ALIASES
            .iter()
            .map(|(alias, name)| ((*alias).to_string(), *name)),
    );
    map
});

// ── Text cleanup ──

/// Undo a UTF-8 → Latin-1 → UTF-8 double encoding.
///
/// Only attempted when a mis-rendering marker is present; if the string does
/// not round-trip through bytes cleanly it is returned untouched.
pub fn repair_mojibake(s: &str) -> Cow<'_, str> {
    if !MOJIBAKE_MARKERS.iter().any(|m| s.contains(m)) {
        return Cow::Borrowed(s);
    }
    let bytes: Option<Vec<u8>> = s.chars().map(|c| u8::try_from(c).ok()).collect();
    match bytes.and_then(|b| String::from_utf8(b).ok()) {
        Some(fixed) => Cow::Owned(fixed),
        None => {
            debug!(input = %s, "mojibake marker present but repair failed");
            Cow::Borrowed(s)
        }
    }
}

/// Repair encoding, collapse whitespace runs to one space, unify dashes.
pub fn clean_text(s: &str) -> String {
    let repaired = repair_mojibake(s);
    repaired
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(DASHES, "-")
}

// ── District ──

/// Map any raw district spelling to its canonical key.
///
/// Native-script names resolve through the fixed table; anything else passes
/// through as its cleaned text. The alias overrides then apply
/// case-insensitively to whichever form came out of the first step.
pub fn normalize_district(raw: &str) -> DistrictKey {
    let cleaned = clean_text(raw);
    let primary = match NATIVE_LOOKUP.get(cleaned.as_str()) {
        Some(english) => (*english).to_string(),
        None => cleaned,
    };
    match ALIAS_LOOKUP.get(&primary.to_lowercase()) {
        Some(canonical) => DistrictKey::new(*canonical),
        None => DistrictKey::new(primary),
    }
}

// ── Party ──

/// Map free-text party names (either script) to the fixed enumeration.
///
/// Rules are tried in [`PARTY_RULES`] order; see there for why the order
/// matters.
pub fn normalize_party(raw: &str) -> PartyKey {
    let lowered = clean_text(raw).to_lowercase();
    PARTY_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map_or(PartyKey::Others, |rule| rule.party)
}
