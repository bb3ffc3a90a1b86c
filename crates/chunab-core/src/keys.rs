//! Canonical identifier spaces shared by the reference roster and the live tally.
//!
//! Every source (results feed, encyclopedia table, boundary file) is reduced to
//! these keys before anything is joined. The flattened tally key built by
//! [`tally_key`] is the only contract between the live pipeline and the map
//! viewer, so its format must never drift.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::tables::CANONICAL_DISTRICTS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown party key: {0}")]
    UnknownParty(String),
    #[error("malformed constituency key: {0}")]
    MalformedConstituency(String),
}

// ── District ──

/// Canonical English district name.
///
/// Only the normalizer constructs these; see [`crate::normalize_district`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DistrictKey(String);

impl DistrictKey {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the 77 canonical districts (as opposed to an
    /// unrecognised passthrough).
    pub fn is_known(&self) -> bool {
        CANONICAL_DISTRICTS.iter().any(|(name, _)| *name == self.0)
    }

    /// Province the district belongs to, for known districts.
    pub fn province(&self) -> Option<&'static str> {
        CANONICAL_DISTRICTS
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, province)| *province)
    }
}

impl fmt::Display for DistrictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Constituency ──

/// A first-past-the-post seat: district plus 1-based per-district ordinal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstituencyKey {
    pub district: DistrictKey,
    pub ordinal: u32,
}

impl ConstituencyKey {
    pub fn new(district: DistrictKey, ordinal: u32) -> Self {
        Self { district, ordinal }
    }
}

impl fmt::Display for ConstituencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.district, self.ordinal)
    }
}

impl Serialize for ConstituencyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for ConstituencyKey {
    type Err = KeyError;

    /// Parse the `District-N` form produced by [`fmt::Display`]. The district
    /// part goes through normalization so aliases still resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (district, ordinal) = s
            .rsplit_once('-')
            .ok_or_else(|| KeyError::MalformedConstituency(s.to_string()))?;
        let ordinal = crate::parse_ordinal(ordinal)
            .ok_or_else(|| KeyError::MalformedConstituency(s.to_string()))?;
        if district.trim().is_empty() {
            return Err(KeyError::MalformedConstituency(s.to_string()));
        }
        Ok(Self::new(crate::normalize_district(district), ordinal))
    }
}

// ── Party ──

/// Fixed party enumeration. Several real parties intentionally share a bucket
/// (every communist/Maoist-lineage party other than UML lands in `Maoist`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartyKey {
    Congress,
    Uml,
    Maoist,
    Rsp,
    Rpp,
    Jsp,
    Lsp,
    Janamat,
    Others,
}

impl PartyKey {
    pub const ALL: [PartyKey; 9] = [
        PartyKey::Congress,
        PartyKey::Uml,
        PartyKey::Maoist,
        PartyKey::Rsp,
        PartyKey::Rpp,
        PartyKey::Jsp,
        PartyKey::Lsp,
        PartyKey::Janamat,
        PartyKey::Others,
    ];

    /// Short key as used in tally keys and reference-table column labels.
    pub fn as_str(self) -> &'static str {
        match self {
            PartyKey::Congress => "Congress",
            PartyKey::Uml => "UML",
            PartyKey::Maoist => "Maoist",
            PartyKey::Rsp => "RSP",
            PartyKey::Rpp => "RPP",
            PartyKey::Jsp => "JSP",
            PartyKey::Lsp => "LSP",
            PartyKey::Janamat => "Janamat",
            PartyKey::Others => "Others",
        }
    }

    /// Full display name, as keyed in the party-symbol mapping file.
    pub fn display_name(self) -> &'static str {
        match self {
            PartyKey::Congress => "Nepali Congress",
            PartyKey::Uml => "Communist Party of Nepal (Unified Marxist–Leninist)",
            PartyKey::Maoist => "Communist Party of Nepal (Maoist Centre)",
            PartyKey::Rsp => "Rastriya Swatantra Party",
            PartyKey::Rpp => "Rastriya Prajatantra Party",
            PartyKey::Jsp => "Janata Samajbadi Party, Nepal",
            PartyKey::Lsp => "Loktantrik Samajwadi Party, Nepal",
            PartyKey::Janamat => "Janamat Party",
            PartyKey::Others => "Others",
        }
    }
}

impl fmt::Display for PartyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PartyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for PartyKey {
    type Err = KeyError;

    /// Exact match against the short keys. Free text goes through
    /// [`crate::normalize_party`] instead, which never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartyKey::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KeyError::UnknownParty(s.to_string()))
    }
}

// ── Flattened tally key ──

/// Build the flattened `"{district}-{ordinal}|{party}"` key, e.g. `Kathmandu-1|UML`.
pub fn tally_key(constituency: &ConstituencyKey, party: PartyKey) -> String {
    format!("{constituency}|{party}")
}
