pub mod areas;
pub mod currency;
pub mod listing;
pub mod location;
pub mod market;
pub mod profile;
pub mod ranker;

pub use listing::{Listing, ListingId, ListingStatus};
pub use location::GeoLocation;
pub use market::{ListingDetail, MarketError, MarketSnapshot, MarketState, ProfileUpdate};
pub use profile::{Profile, ProfileId};
pub use ranker::{rank_listings, RankedListing, RankingCriteria, SortKey};

/// Failure to parse one of the enumerated codes (currency, unit, status, sort key).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
