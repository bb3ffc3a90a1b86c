//! The process-wide live snapshot.
//!
//! A [`Snapshot`] is immutable. The [`SnapshotStore`] re-points an
//! [`ArcSwap`] at a fully built replacement, so readers always see either the
//! whole previous tally or the whole new one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use chunab_core::VoteTally;
use serde::Serialize;

/// Timestamped view of the live tally.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
    pub votes: Arc<VoteTally>,
    #[serde(skip)]
    fingerprint: Arc<str>,
}

impl Snapshot {
    pub fn new(fetched_at: DateTime<Utc>, votes: VoteTally) -> Self {
        let fingerprint = votes.fingerprint().into();
        Self {
            fetched_at,
            votes: Arc::new(votes),
            fingerprint,
        }
    }

    /// Empty tally stamped `fetched_at`.
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self::new(fetched_at, VoteTally::new())
    }

    /// Fingerprint of [`Self::votes`], computed once at construction.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Same votes (shared, not copied) with a new timestamp.
    pub fn touched(&self, fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            votes: Arc::clone(&self.votes),
            fingerprint: Arc::clone(&self.fingerprint),
        }
    }

    /// JSON `{fetchedAt, votes}` as sent to clients.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Holder of the current snapshot. One writer (the poller), any number of
/// readers.
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The current snapshot. No side effects.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Swap in a new snapshot wholesale.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        self.current.store(Arc::clone(&next));
        next
    }

    /// Move the timestamp forward without touching the votes.
    pub fn touch(&self, fetched_at: DateTime<Utc>) -> Arc<Snapshot> {
        let next = Arc::new(self.current.load().touched(fetched_at));
        self.current.store(Arc::clone(&next));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn tally(pairs: &[(&str, u64)]) -> VoteTally {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn json_shape() {
        let snap = Snapshot::new(at(0), tally(&[("Jhapa-1|UML", 4821)]));
        assert_eq!(
            snap.to_json().unwrap(),
            r#"{"fetchedAt":"1970-01-01T00:00:00Z","votes":{"Jhapa-1|UML":4821}}"#
        );
    }

    #[test]
    fn touch_keeps_votes_identical() {
        let store = SnapshotStore::new(Snapshot::new(at(0), tally(&[("Jhapa-1|UML", 1)])));
        let before = store.current();
        let after = store.touch(at(60));
        assert_eq!(after.fetched_at, at(60));
        assert!(Arc::ptr_eq(&before.votes, &after.votes));
        assert_eq!(before.fingerprint(), after.fingerprint());
        assert_eq!(store.current().fetched_at, at(60));
    }

    #[test]
    fn replace_is_wholesale() {
        let store = SnapshotStore::new(Snapshot::new(at(0), tally(&[("a", 1), ("b", 2)])));
        let held = store.current();
        store.replace(Snapshot::new(at(5), tally(&[("c", 3)])));

        // A reader holding the old snapshot still sees all of it.
        assert_eq!(held.votes.len(), 2);
        let now = store.current();
        assert_eq!(now.votes.len(), 1);
        assert_eq!(now.votes.get("c"), Some(3));
        assert_eq!(now.fingerprint(), "c:3;");
    }

    #[test]
    fn empty_store_has_empty_fingerprint() {
        let store = SnapshotStore::new(Snapshot::empty(at(0)));
        assert!(store.current().votes.is_empty());
        assert_eq!(store.current().fingerprint(), "");
    }
}
