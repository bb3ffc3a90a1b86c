//! Live results sync: feed client and the change-detecting poller.

pub mod http;
pub mod poller;

pub use http::{FeedClient, FeedConfig, FeedSource, SyncError};
pub use poller::{PollOutcome, PollStats, Poller, build_tally, normalize_row};
