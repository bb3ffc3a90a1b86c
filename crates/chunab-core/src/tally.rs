//! Flattened live vote tally and its change fingerprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Vote counts keyed by the flattened `"{district}-{ordinal}|{party}"` key.
///
/// Backed by a `BTreeMap` so iteration (and therefore serialization and the
/// fingerprint) is always in lexicographic key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTally(BTreeMap<String, u64>);

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add votes under `key`, summing with anything already there.
    ///
    /// Several raw parties can collapse into one key (the `Others` bucket),
    /// so rows accumulate rather than overwrite.
    pub fn add(&mut self, key: String, votes: u64) {
        let slot = self.0.entry(key).or_insert(0);
        *slot = slot.saturating_add(votes);
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all votes in the tally.
    pub fn total_votes(&self) -> u64 {
        self.0.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Deterministic `key:value;` concatenation over sorted keys.
    ///
    /// Equal fingerprints mean equal vote content; this is the only change
    /// signal the poller uses. Unrecognised districts keep their raw text, so
    /// `\`, `:` and `;` inside a key are backslash-escaped to keep the
    /// encoding unambiguous.
    pub fn fingerprint(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 24);
        for (key, votes) in &self.0 {
            for c in key.chars() {
                if matches!(c, '\\' | ':' | ';') {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push(':');
            out.push_str(&votes.to_string());
            out.push(';');
        }
        out
    }
}

impl FromIterator<(String, u64)> for VoteTally {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut tally = VoteTally::new();
        for (key, votes) in iter {
            tally.add(key, votes);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(pairs: &[(&str, u64)]) -> VoteTally {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = tally(&[("Jhapa-1|UML", 10), ("Jhapa-1|Congress", 7), ("Dang-2|RSP", 3)]);
        let b = tally(&[("Dang-2|RSP", 3), ("Jhapa-1|UML", 10), ("Jhapa-1|Congress", 7)]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_one_value() {
        let a = tally(&[("Jhapa-1|UML", 10), ("Jhapa-1|Congress", 7)]);
        let b = tally(&[("Jhapa-1|UML", 11), ("Jhapa-1|Congress", 7)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_format() {
        let t = tally(&[("b", 2), ("a", 1)]);
        assert_eq!(t.fingerprint(), "a:1;b:2;");
        assert_eq!(VoteTally::new().fingerprint(), "");
    }

    #[test]
    fn separators_inside_keys_cannot_collide() {
        let split = tally(&[("a-1|UML", 1), ("b;c-1|UML", 2)]);
        let merged = tally(&[("a-1|UML:1;b;c-1|UML", 2)]);
        assert_ne!(split, merged);
        assert_ne!(split.fingerprint(), merged.fingerprint());
        assert_eq!(split.fingerprint(), "a-1|UML:1;b\\;c-1|UML:2;");

        let escaped = tally(&[("x\\:-1|UML", 1)]);
        let plain = tally(&[("x\\", 0), ("-1|UML", 1)]);
        assert_ne!(escaped.fingerprint(), plain.fingerprint());
    }

    #[test]
    fn duplicate_keys_accumulate() {
        let t = tally(&[("Jhapa-1|Others", 5), ("Jhapa-1|Others", 8)]);
        assert_eq!(t.get("Jhapa-1|Others"), Some(13));
        assert_eq!(t.len(), 1);
        assert_eq!(t.total_votes(), 13);
    }

    #[test]
    fn serializes_as_flat_object() {
        let t = tally(&[("Kathmandu-1|UML", 4821)]);
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"Kathmandu-1|UML":4821}"#);
    }
}
