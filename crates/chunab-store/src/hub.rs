//! The live hub: current snapshot plus its subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::registry::{Frame, PublishReport, SnapshotSink, SubscriberId, SubscriberRegistry};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::StoreError;

pub struct LiveHub {
    store: SnapshotStore,
    registry: SubscriberRegistry,
}

impl Default for LiveHub {
    /// Empty tally stamped now, the state before the first successful poll.
    fn default() -> Self {
        Self::new(Snapshot::empty(Utc::now()))
    }
}

impl LiveHub {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            store: SnapshotStore::new(initial),
            registry: SubscriberRegistry::new(),
        }
    }

    /// Current snapshot for pull clients. No side effects.
    pub fn current(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Register a sink; it receives the current snapshot before anything else.
    pub fn subscribe(&self, sink: Arc<dyn SnapshotSink>) -> Result<SubscriberId, StoreError> {
        // Encode up front so an encoding failure surfaces as an error rather
        // than an empty frame.
        let snapshot = self.store.current();
        let json: Frame = snapshot.to_json()?.into();
        let store = &self.store;
        let id = self.registry.register(sink, || {
            let latest = store.current();
            if Arc::ptr_eq(&latest, &snapshot) {
                json
            } else {
                // Re-encode only when a publish slipped in between.
                latest.to_json().map(Frame::from).unwrap_or(json)
            }
        })?;
        Ok(id)
    }

    /// Latest-value subscription, the form the HTTP stream uses.
    ///
    /// The receiver already holds the current snapshot, marked unseen. A
    /// reader that falls behind skips intermediate snapshots but never stays
    /// on a stale one.
    pub fn subscribe_latest(&self) -> Result<(SubscriberId, watch::Receiver<Frame>), StoreError> {
        let (tx, rx) = watch::channel(Frame::from(""));
        let id = self.subscribe(Arc::new(tx))?;
        Ok((id, rx))
    }

    /// Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.registry.unsubscribe(id)
    }

    /// Replace the snapshot and fan it out to every subscriber.
    pub fn publish(&self, snapshot: Snapshot) -> Result<PublishReport, StoreError> {
        let json: Frame = snapshot.to_json()?.into();
        let published = self.store.replace(snapshot);
        let report = self.registry.publish(&json);
        info!(
            fetched_at = %published.fetched_at,
            keys = published.votes.len(),
            delivered = report.delivered,
            lagged = report.lagged,
            dropped = report.dropped,
            "published snapshot"
        );
        if report.lagged > 0 {
            warn!(lagged = report.lagged, "some subscribers missed this snapshot");
        }
        Ok(report)
    }

    /// Freshness-only update: new timestamp, same votes, no broadcast.
    pub fn touch(&self, fetched_at: DateTime<Utc>) -> Arc<Snapshot> {
        self.store.touch(fetched_at)
    }
}
