//! Subscriber registry for the live stream.
//!
//! Subscribers come and go from connection handlers while the poller may be
//! mid-publish. Publishing iterates a copy of the subscriber list taken at the
//! start, so concurrent subscribe/unsubscribe never disturbs an in-flight
//! fan-out, and one failing subscriber never stops delivery to the rest.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::DeliveryError;

/// An encoded snapshot (JSON), shared across all subscribers of one publish.
pub type Frame = Arc<str>;

/// Anything that can accept frames without blocking the publisher.
pub trait SnapshotSink: Send + Sync {
    fn deliver(&self, frame: Frame) -> Result<(), DeliveryError>;
}

/// Latest-value slot: a new frame overwrites one the subscriber has not read
/// yet, so a slow reader skips intermediate snapshots but always ends up on
/// the newest one. Never reports `Full`.
impl SnapshotSink for watch::Sender<Frame> {
    fn deliver(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.send(frame).map_err(|_| DeliveryError::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    /// Subscribers whose buffer was full; they miss this frame but stay.
    pub lagged: usize,
    /// Subscribers found closed and removed.
    pub dropped: usize,
}

#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: Mutex<BTreeMap<SubscriberId, Arc<dyn SnapshotSink>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SubscriberId, Arc<dyn SnapshotSink>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `initial()` to the sink, then add it to the active set.
    ///
    /// Both happen under the registry lock, so a publish racing with this
    /// call either lands before the initial frame is built (and the initial
    /// frame already reflects it) or after the sink is registered. The sink
    /// must not call back into the registry from `deliver`.
    pub fn register(
        &self,
        sink: Arc<dyn SnapshotSink>,
        initial: impl FnOnce() -> Frame,
    ) -> Result<SubscriberId, DeliveryError> {
        let mut subscribers = self.lock();
        sink.deliver(initial())?;
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        subscribers.insert(id, sink);
        debug!(subscriber = id.0, active = subscribers.len(), "subscriber added");
        Ok(id)
    }

    /// Remove a subscriber. Returns whether it was still present; calling it
    /// again is harmless.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock();
        let removed = subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = id.0, active = subscribers.len(), "subscriber removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Send `frame` to every subscriber registered when the call starts.
    pub fn publish(&self, frame: &Frame) -> PublishReport {
        let targets: Vec<(SubscriberId, Arc<dyn SnapshotSink>)> = self
            .lock()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();

        let mut report = PublishReport::default();
        for (id, sink) in targets {
            match sink.deliver(Arc::clone(frame)) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::Full) => {
                    report.lagged += 1;
                    warn!(subscriber = id.0, "subscriber lagging, frame dropped");
                }
                Err(DeliveryError::Closed) => {
                    report.dropped += 1;
                    self.unsubscribe(id);
                }
            }
        }
        report
    }
}
