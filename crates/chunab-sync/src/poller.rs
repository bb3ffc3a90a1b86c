//! Live poller and change detector.
//!
//! Every tick: fetch the feed, normalize each row into the flattened tally
//! key, fingerprint the result, and publish only when the fingerprint moved.
//! An unchanged poll just bumps the snapshot timestamp.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use chunab_core::{
    ConstituencyKey, LiveRow, VoteTally, cell_text, coerce_votes, normalize_district,
    normalize_party, parse_ordinal, tally_key,
};
use chunab_store::{LiveHub, PublishReport, Snapshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::http::FeedSource;

// ── Row normalization ──

/// Row counts for one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub rows: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Normalize one feed row to `(tally key, votes)`.
///
/// `None` when district, ordinal, or party is missing or unusable. A bad
/// vote count is not a reason to drop the row; it counts as zero.
pub fn normalize_row(row: &LiveRow) -> Option<(String, u64)> {
    let district = row.district_name.as_ref().and_then(cell_text)?;
    let ordinal = row.constituency_id.as_ref().and_then(cell_text)?;
    let party = row.party_name.as_ref().and_then(cell_text)?;

    let seat = ConstituencyKey::new(normalize_district(&district), parse_ordinal(&ordinal)?);
    let votes = coerce_votes(row.total_votes.as_ref());
    Some((tally_key(&seat, normalize_party(&party)), votes))
}

/// Fold feed rows into a tally. Rows sharing a key are summed.
pub fn build_tally(rows: &[LiveRow]) -> (VoteTally, PollStats) {
    let mut tally = VoteTally::new();
    let mut stats = PollStats {
        rows: rows.len(),
        ..Default::default()
    };
    for row in rows {
        match normalize_row(row) {
            Some((key, votes)) => {
                tally.add(key, votes);
                stats.kept += 1;
            }
            None => {
                stats.dropped += 1;
                debug!(?row, "dropping live row missing district, ordinal, or party");
            }
        }
    }
    (tally, stats)
}

// ── Poller ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No feed configured.
    Disabled,
    /// A previous poll was still running.
    Skipped,
    /// Fetch or decode failed; previous snapshot kept.
    Failed,
    /// Same votes as before; timestamp moved, nothing broadcast.
    Unchanged(PollStats),
    /// New votes published.
    Changed(PollStats, PublishReport),
}

/// Clears the in-progress flag when a poll ends, however it ends.
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Poller {
    source: Option<Arc<dyn FeedSource>>,
    hub: Arc<LiveHub>,
    in_progress: AtomicBool,
}

impl Poller {
    /// `source` is `None` when no feed URL is configured; every poll is then
    /// a no-op and the snapshot stays static.
    pub fn new(source: Option<Arc<dyn FeedSource>>, hub: Arc<LiveHub>) -> Self {
        Self {
            source,
            hub,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Run one poll cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        let Some(source) = &self.source else {
            return PollOutcome::Disabled;
        };
        if self.in_progress.swap(true, Ordering::AcqRel) {
            warn!("previous poll still running, skipping this tick");
            return PollOutcome::Skipped;
        }
        let _guard = InProgress(&self.in_progress);

        let rows = match source.fetch_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "live feed fetch failed, keeping previous snapshot");
                return PollOutcome::Failed;
            }
        };

        let (tally, stats) = build_tally(&rows);
        let next = Snapshot::new(Utc::now(), tally);
        if next.fingerprint() == self.hub.current().fingerprint() {
            self.hub.touch(next.fetched_at);
            debug!(rows = stats.rows, kept = stats.kept, "live tally unchanged");
            return PollOutcome::Unchanged(stats);
        }

        info!(
            rows = stats.rows,
            kept = stats.kept,
            dropped = stats.dropped,
            keys = next.votes.len(),
            "live tally changed"
        );
        match self.hub.publish(next) {
            Ok(report) => PollOutcome::Changed(stats, report),
            Err(e) => {
                warn!(error = %e, "could not publish snapshot");
                PollOutcome::Failed
            }
        }
    }

    /// Poll on a fixed interval until the task is dropped.
    ///
    /// Each tick spawns its poll, so a slow fetch never delays the timer;
    /// the in-progress guard turns an overlapping tick into a skip.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        if !self.is_enabled() {
            info!("no live feed configured, serving a static snapshot");
            return;
        }
        info!(interval_secs = interval.as_secs(), "starting live poller");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let poller = Arc::clone(&self);
            tokio::spawn(async move {
                poller.poll_once().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncError;
    use async_trait::async_trait;
    use chunab_core::{PartyKey, ReferenceFile};
    use chunab_roster::CandidateIndex;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn rows(value: Value) -> Vec<LiveRow> {
        serde_json::from_value(value).unwrap()
    }

    fn jhapa_rows(uml_votes: &str) -> Vec<LiveRow> {
        rows(json!([
            {"DistrictName": "झापा", "SCConstID": "1", "PoliticalPartyName": "एमाले", "TotalVoteReceived": uml_votes},
            {"DistrictName": "झापा", "SCConstID": "1", "PoliticalPartyName": "नेपाली कांग्रेस", "TotalVoteReceived": "3900"}
        ]))
    }

    /// Replays canned responses in order.
    struct Scripted(Mutex<VecDeque<Result<Vec<LiveRow>, SyncError>>>);

    impl Scripted {
        fn new(responses: Vec<Result<Vec<LiveRow>, SyncError>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(responses.into())))
        }
    }

    #[async_trait]
    impl FeedSource for Scripted {
        async fn fetch_rows(&self) -> Result<Vec<LiveRow>, SyncError> {
            self.0.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn poller(source: Arc<dyn FeedSource>) -> (Poller, Arc<LiveHub>) {
        let hub = Arc::new(LiveHub::default());
        (Poller::new(Some(source), Arc::clone(&hub)), hub)
    }

    #[test]
    fn live_row_normalizes_to_flat_key() {
        let (tally, stats) = build_tally(&rows(json!([
            {"DistrictName": "झापा", "SCConstID": "1", "PoliticalPartyName": "एमाले", "TotalVoteReceived": "4821"}
        ])));
        assert_eq!(tally.get("Jhapa-1|UML"), Some(4821));
        assert_eq!(stats, PollStats { rows: 1, kept: 1, dropped: 0 });
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let (tally, stats) = build_tally(&rows(json!([
            {"SCConstID": "1", "PoliticalPartyName": "एमाले", "TotalVoteReceived": "1"},
            {"DistrictName": "झापा", "PoliticalPartyName": "एमाले"},
            {"DistrictName": "झापा", "SCConstID": "x", "PoliticalPartyName": "एमाले"},
            {"DistrictName": "झापा", "SCConstID": 2, "PoliticalPartyName": "  "},
            {"DistrictName": "झापा", "SCConstID": 2, "PoliticalPartyName": "जनमत पार्टी", "TotalVoteReceived": "n/a"}
        ])));
        assert_eq!(stats, PollStats { rows: 5, kept: 1, dropped: 4 });
        assert_eq!(tally.get("Jhapa-2|Janamat"), Some(0));
    }

    #[test]
    fn minor_parties_sum_into_others() {
        let (tally, _) = build_tally(&rows(json!([
            {"DistrictName": "Dang", "SCConstID": "3", "PoliticalPartyName": "Party A", "TotalVoteReceived": 10},
            {"DistrictName": "दाङ", "SCConstID": "३", "PoliticalPartyName": "स्वतन्त्र", "TotalVoteReceived": 5}
        ])));
        assert_eq!(tally.get("Dang-3|Others"), Some(15));
    }

    #[tokio::test]
    async fn disabled_without_source() {
        let hub = Arc::new(LiveHub::default());
        let before = hub.current();
        let poller = Poller::new(None, Arc::clone(&hub));
        assert_eq!(poller.poll_once().await, PollOutcome::Disabled);
        assert!(Arc::ptr_eq(&before, &hub.current()));
    }

    #[tokio::test]
    async fn unchanged_poll_touches_without_broadcast() {
        let (p, hub) = poller(Scripted::new(vec![Ok(jhapa_rows("4821")), Ok(jhapa_rows("4821"))]));
        let (_id, mut rx) = hub.subscribe_latest().unwrap();
        rx.borrow_and_update();

        assert!(matches!(p.poll_once().await, PollOutcome::Changed(_, r) if r.delivered == 1));
        let first = hub.current();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains("\"Jhapa-1|UML\":4821"));

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(matches!(p.poll_once().await, PollOutcome::Unchanged(_)));
        let second = hub.current();

        assert!(second.fetched_at > first.fetched_at);
        assert!(Arc::ptr_eq(&first.votes, &second.votes));
        assert_eq!(
            serde_json::to_string(&*first.votes).unwrap(),
            serde_json::to_string(&*second.votes).unwrap()
        );
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn changed_vote_is_published() {
        let (p, hub) = poller(Scripted::new(vec![Ok(jhapa_rows("4821")), Ok(jhapa_rows("4900"))]));
        p.poll_once().await;
        assert!(matches!(p.poll_once().await, PollOutcome::Changed(..)));
        assert_eq!(hub.current().votes.get("Jhapa-1|UML"), Some(4900));
    }

    #[tokio::test]
    async fn separator_text_in_unknown_district_still_counts_as_change() {
        let (p, hub) = poller(Scripted::new(vec![
            Ok(rows(json!([
                {"DistrictName": "a", "SCConstID": "1", "PoliticalPartyName": "UML", "TotalVoteReceived": 1},
                {"DistrictName": "b;c", "SCConstID": "1", "PoliticalPartyName": "UML", "TotalVoteReceived": 2}
            ]))),
            Ok(rows(json!([
                {"DistrictName": "a-1|UML:1;b;c", "SCConstID": "1", "PoliticalPartyName": "UML", "TotalVoteReceived": 2}
            ]))),
        ]));
        assert!(matches!(p.poll_once().await, PollOutcome::Changed(..)));
        assert!(matches!(p.poll_once().await, PollOutcome::Changed(..)));
        assert_eq!(hub.current().votes.get("a-1|UML:1;b;c-1|UML"), Some(2));
        assert_eq!(hub.current().votes.len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_snapshot() {
        let (p, hub) = poller(Scripted::new(vec![
            Ok(jhapa_rows("4821")),
            Err(SyncError::Server {
                status: 502,
                body: "bad gateway".into(),
            }),
        ]));
        p.poll_once().await;
        let before = hub.current();
        assert_eq!(p.poll_once().await, PollOutcome::Failed);
        assert!(Arc::ptr_eq(&before, &hub.current()));

        // Next cycle runs normally.
        assert!(matches!(p.poll_once().await, PollOutcome::Changed(..)));
    }

    /// Blocks inside fetch until released.
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl FeedSource for Gate {
        async fn fetch_rows(&self) -> Result<Vec<LiveRow>, SyncError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(jhapa_rows("1"))
        }
    }

    #[tokio::test]
    async fn overlapping_poll_is_skipped() {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (p, _hub) = poller(gate.clone());
        let p = Arc::new(p);

        let slow = tokio::spawn({
            let p = Arc::clone(&p);
            async move { p.poll_once().await }
        });
        gate.entered.notified().await;

        assert_eq!(p.poll_once().await, PollOutcome::Skipped);

        gate.release.notify_one();
        assert!(matches!(slow.await.unwrap(), PollOutcome::Changed(..)));

        // Guard released: the next poll runs (and blocks on the gate again).
        let again = tokio::spawn({
            let p = Arc::clone(&p);
            async move { p.poll_once().await }
        });
        gate.entered.notified().await;
        gate.release.notify_one();
        assert!(matches!(again.await.unwrap(), PollOutcome::Unchanged(_)));
    }

    #[tokio::test]
    async fn reference_and_live_keys_join() {
        let reference: ReferenceFile = serde_json::from_value(json!({
            "source": "wiki",
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Jhapa 1", "Congress": "A. Sharma", "UML": "B. Thapa"}
                ]
            }
        }))
        .unwrap();
        let index = CandidateIndex::from_reference(&reference);

        let (p, hub) = poller(Scripted::new(vec![Ok(rows(json!([
            {"DistrictName": "झापा", "SCConstID": "1", "PoliticalPartyName": "एमाले", "TotalVoteReceived": "4821"}
        ])))]));
        p.poll_once().await;
        let snapshot = hub.current();

        let mut joined = Vec::new();
        for record in index.records() {
            let key = tally_key(&record.constituency, record.party);
            joined.push((record.party, record.candidates.to_vec(), snapshot.votes.get(&key)));
        }
        assert_eq!(
            joined,
            vec![
                (PartyKey::Congress, vec!["A. Sharma".to_string()], None),
                (PartyKey::Uml, vec!["B. Thapa".to_string()], Some(4821)),
            ]
        );
    }
}
