//! Reference roster: joins the scraped candidate tables into an index keyed by
//! constituency and party.

mod error;
pub mod index;
pub mod sanitize;
pub mod split;

pub use error::RosterError;
pub use index::{CandidateIndex, CandidateRecord, RosterSummary, Seat};
pub use sanitize::sanitize_cell;
pub use split::{SplitStrategy, split_candidates, split_with_strategy};
