//! Live state: the current vote snapshot and the subscribers it fans out to.

mod error;
pub mod hub;
pub mod registry;
pub mod snapshot;

pub use error::{DeliveryError, StoreError};
pub use hub::LiveHub;
pub use registry::{Frame, PublishReport, SnapshotSink, SubscriberId, SubscriberRegistry};
pub use snapshot::{Snapshot, SnapshotStore};
