pub mod feed;
pub mod keys;
pub mod normalize;
pub mod ordinal;
pub mod tables;
pub mod tally;

pub use feed::{FeedBody, LiveRow, ReferenceFile, ReferenceRow, SymbolFile, cell_text, coerce_votes};
pub use keys::{ConstituencyKey, DistrictKey, KeyError, PartyKey, tally_key};
pub use normalize::{clean_text, normalize_district, normalize_party, repair_mojibake};
pub use ordinal::{UNPARSED_ORDINAL, constituency_key, parse_ordinal, sort_ordinal, split_constituency};
pub use tally::VoteTally;
