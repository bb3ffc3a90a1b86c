//! Wire shapes for the three upstream sources.
//!
//! All three are loosely typed: the reference table has inconsistent column
//! sets per row, and the live feed sends numbers as strings (or not). Cells
//! stay as [`serde_json::Value`] until the normalizer looks at them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keys::PartyKey;
use crate::normalize::normalize_party;

/// One loosely-typed row of the reference table, keyed by column label.
pub type ReferenceRow = serde_json::Map<String, Value>;

/// Reference candidate data produced out of band by the scraping script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceFile {
    #[serde(default)]
    pub source: String,
    /// ISO 8601 timestamp string.
    #[serde(rename = "fetchedAt", default)]
    pub fetched_at: String,
    /// Province label → rows in table order.
    #[serde(default)]
    pub provinces: BTreeMap<String, Vec<ReferenceRow>>,
}

/// Party-symbol mapping: full party display name → image path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolFile {
    #[serde(default)]
    pub source: String,
    #[serde(rename = "fetchedAt", default)]
    pub fetched_at: String,
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

impl SymbolFile {
    /// Image path for a party key.
    ///
    /// Looks up the key's fixed display name first; if the file uses some
    /// other spelling, falls back to the first entry whose name normalizes to
    /// the same key. `Others` never gets a symbol.
    pub fn symbol_for(&self, party: PartyKey) -> Option<&str> {
        if party == PartyKey::Others {
            return None;
        }
        if let Some(path) = self.symbols.get(party.display_name()) {
            return Some(path.as_str());
        }
        self.symbols
            .iter()
            .find(|(name, _)| normalize_party(name) == party)
            .map(|(_, path)| path.as_str())
    }
}

/// One row of the live results feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveRow {
    #[serde(rename = "DistrictName", default)]
    pub district_name: Option<Value>,
    #[serde(rename = "SCConstID", default)]
    pub constituency_id: Option<Value>,
    #[serde(rename = "PoliticalPartyName", default)]
    pub party_name: Option<Value>,
    #[serde(rename = "TotalVoteReceived", default)]
    pub total_votes: Option<Value>,
}

/// The live feed body: either a bare array of rows or wrapped in `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedBody {
    Rows(Vec<LiveRow>),
    Wrapped { data: Vec<LiveRow> },
}

impl FeedBody {
    pub fn into_rows(self) -> Vec<LiveRow> {
        match self {
            FeedBody::Rows(rows) | FeedBody::Wrapped { data: rows } => rows,
        }
    }
}

/// Stringify a loosely-typed cell. Strings are trimmed; empty strings, nulls,
/// and structured values yield `None`.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a vote-count cell to a non-negative integer, defaulting to zero.
///
/// Accepts numbers and numeric strings (thousands separators tolerated).
/// Negative, fractional garbage, or non-numeric input gives 0.
pub fn coerce_votes(value: Option<&Value>) -> u64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v.floor() as u64,
        _ => 0,
    }
}
