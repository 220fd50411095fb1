//! Filtering and ordering of listings for a single viewer.
//!
//! [`rank_listings`] is a pure function of its arguments: it borrows the
//! listing set, never mutates it, and returns a fresh sequence annotated with
//! each listing's great-circle distance from the viewer.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::listing::{Listing, ListingStatus};
use crate::location::GeoLocation;
use crate::ParseError;

/// Order of the ranked view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "distance")]
    DistanceAsc,
    #[serde(rename = "price-low")]
    PriceAsc,
    #[serde(rename = "price-high")]
    PriceDesc,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::Newest,
            SortKey::DistanceAsc,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::DistanceAsc => "distance",
            SortKey::PriceAsc => "price-low",
            SortKey::PriceDesc => "price-high",
        }
    }

    fn compare(&self, a: &RankedListing<'_>, b: &RankedListing<'_>) -> Ordering {
        match self {
            SortKey::Newest => b.listing.created_at.cmp(&a.listing.created_at),
            SortKey::DistanceAsc => a.distance_km.total_cmp(&b.distance_km),
            SortKey::PriceAsc => a.listing.price.total_cmp(&b.listing.price),
            SortKey::PriceDesc => b.listing.price.total_cmp(&a.listing.price),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::all()
            .iter()
            .copied()
            .find(|k| k.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("sort key", s))
    }
}

/// Filter and sort criteria, built by the UI layer from its inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCriteria {
    /// Case-insensitive substring of the crop name. Empty matches everything.
    #[serde(default)]
    pub search_text: Option<String>,
    /// Inclusive great-circle radius from the viewer. None means unbounded.
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
    /// Restrict to a single status. None shows every status.
    #[serde(default)]
    pub status: Option<ListingStatus>,
}

impl RankingCriteria {
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn with_radius(mut self, km: f64) -> Self {
        self.radius_km = Some(km);
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A listing with its distance from the viewer.
///
/// `distance_km` is infinite when the listing's coordinates are malformed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedListing<'a> {
    #[serde(flatten)]
    pub listing: &'a Listing,
    pub distance_km: f64,
}

/// Distance from `viewer` to `listing`, or infinity if the listing's location is malformed.
pub fn distance_from(viewer: &GeoLocation, listing: &Listing) -> f64 {
    match viewer.checked_distance_km(&listing.location) {
        Ok(km) if km.is_finite() => km,
        Ok(km) => {
            tracing::debug!(listing = %listing.id, km, "non-finite distance, treating as unreachable");
            f64::INFINITY
        }
        Err(err) => {
            tracing::debug!(listing = %listing.id, %err, "treating listing as unreachable");
            f64::INFINITY
        }
    }
}

/// Produce the viewer's filtered, ordered, distance-annotated view of `listings`.
///
/// A missing or malformed viewer origin yields an empty result. Ties keep
/// the input order.
pub fn rank_listings<'a>(
    listings: &'a [Listing],
    viewer: Option<&GeoLocation>,
    criteria: &RankingCriteria,
) -> Vec<RankedListing<'a>> {
    let Some(viewer) = viewer.filter(|v| v.is_valid()) else {
        tracing::debug!("no usable viewer origin, returning empty ranking");
        return Vec::new();
    };

    let needle = criteria
        .search_text
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty());

    let mut ranked: Vec<RankedListing<'a>> = listings
        .iter()
        .map(|listing| RankedListing {
            listing,
            distance_km: distance_from(viewer, listing),
        })
        .filter(|r| {
            needle
                .as_deref()
                .is_none_or(|n| r.listing.crop_name.to_lowercase().contains(n))
        })
        .filter(|r| criteria.radius_km.is_none_or(|max| r.distance_km <= max))
        .filter(|r| criteria.status.is_none_or(|s| r.listing.status == s))
        .collect();

    ranked.sort_by(|a, b| criteria.sort.compare(a, b));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingId;
    use crate::profile::ProfileId;

    const T: i64 = 1_700_000_000_000;

    fn listing(id: &str, crop: &str, price: f64, lat: f64, lng: f64, created_at: i64) -> Listing {
        Listing {
            id: ListingId(id.into()),
            owner_id: ProfileId("owner".into()),
            crop_name: crop.into(),
            price,
            quantity: 1.0,
            location: GeoLocation::new(lat, lng),
            created_at,
            ..Default::default()
        }
    }

    fn ids(ranked: &[RankedListing<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.listing.id.0.clone()).collect()
    }

    fn viewer() -> GeoLocation {
        GeoLocation::new(23.8103, 90.3563)
    }

    #[test]
    fn no_viewer_sees_nothing() {
        let listings = vec![listing("a", "Tomato", 1.0, 23.8, 90.4, T)];
        assert!(rank_listings(&listings, None, &RankingCriteria::default()).is_empty());
    }

    #[test]
    fn malformed_viewer_fails_closed() {
        let listings = vec![listing("a", "Tomato", 1.0, 23.8, 90.4, T)];
        let bad = GeoLocation::new(95.0, 90.0);
        assert!(rank_listings(&listings, Some(&bad), &RankingCriteria::default()).is_empty());
        let nan = GeoLocation::new(f64::NAN, 90.0);
        assert!(rank_listings(&listings, Some(&nan), &RankingCriteria::default()).is_empty());
    }

    #[test]
    fn distance_sort_places_nearer_listing_first() {
        let listings = vec![
            listing("dhanmondi", "Peppers", 120.0, 23.7461, 90.3742, T),
            listing("mirpur14", "Lettuce", 60.0, 23.7808, 90.4125, T),
        ];
        let criteria = RankingCriteria::default().with_sort(SortKey::DistanceAsc);
        let ranked = rank_listings(&listings, Some(&viewer()), &criteria);

        assert_eq!(ids(&ranked), vec!["mirpur14", "dhanmondi"]);
        assert!(ranked.iter().all(|r| r.distance_km > 0.0));
        assert!((ranked[0].distance_km - 6.6).abs() < 0.5);
        assert!((ranked[1].distance_km - 7.4).abs() < 0.5);
    }

    #[test]
    fn newest_first_by_default() {
        let listings = vec![
            listing("t0", "A", 1.0, 23.8, 90.3, T),
            listing("t1", "B", 1.0, 23.8, 90.3, T + 1000),
            listing("t2", "C", 1.0, 23.8, 90.3, T + 2000),
        ];
        let ranked = rank_listings(&listings, Some(&viewer()), &RankingCriteria::default());
        assert_eq!(ids(&ranked), vec!["t2", "t1", "t0"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let listings = vec![
            listing("first", "A", 5.0, 23.8, 90.3, T),
            listing("second", "B", 5.0, 23.8, 90.3, T),
            listing("third", "C", 5.0, 23.8, 90.3, T),
        ];
        for sort in SortKey::all() {
            let criteria = RankingCriteria::default().with_sort(*sort);
            let ranked = rank_listings(&listings, Some(&viewer()), &criteria);
            assert_eq!(ids(&ranked), vec!["first", "second", "third"], "sort {sort}");
        }
    }

    #[test]
    fn zero_radius_includes_listing_at_viewer() {
        let v = viewer();
        let listings = vec![
            listing("here", "Tomato", 1.0, v.lat, v.lng, T),
            listing("there", "Tomato", 1.0, 23.7461, 90.3742, T),
        ];
        let criteria = RankingCriteria::default().with_radius(0.0);
        let ranked = rank_listings(&listings, Some(&v), &criteria);
        assert_eq!(ids(&ranked), vec!["here"]);
        assert_eq!(ranked[0].distance_km, 0.0);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let listings = vec![
            listing("a", "Organic Tomatoes", 1.0, 23.8, 90.3, T),
            listing("b", "Cherry Tomatoes", 1.0, 23.8, 90.3, T + 1),
            listing("c", "Lettuce", 1.0, 23.8, 90.3, T + 2),
        ];
        let criteria = RankingCriteria::default().with_search("TOMATO");
        let ranked = rank_listings(&listings, Some(&viewer()), &criteria);
        assert_eq!(ids(&ranked), vec!["b", "a"]);

        let empty = RankingCriteria::default().with_search("");
        assert_eq!(rank_listings(&listings, Some(&viewer()), &empty).len(), 3);
    }

    #[test]
    fn price_sorts() {
        let listings = vec![
            listing("mid", "A", 80.0, 23.8, 90.3, T),
            listing("low", "B", 40.0, 23.8, 90.3, T),
            listing("high", "C", 200.0, 23.8, 90.3, T),
        ];
        let asc = RankingCriteria::default().with_sort(SortKey::PriceAsc);
        let desc = RankingCriteria::default().with_sort(SortKey::PriceDesc);
        assert_eq!(
            ids(&rank_listings(&listings, Some(&viewer()), &asc)),
            vec!["low", "mid", "high"]
        );
        assert_eq!(
            ids(&rank_listings(&listings, Some(&viewer()), &desc)),
            vec!["high", "mid", "low"]
        );
    }

    #[test]
    fn malformed_listing_is_unreachable_not_fatal() {
        let listings = vec![
            listing("broken", "Tomato", 1.0, f64::NAN, 90.3, T + 10),
            listing("far-north", "Tomato", 1.0, 91.0, 90.3, T + 5),
            listing("ok", "Tomato", 1.0, 23.78, 90.41, T),
        ];

        let by_distance = RankingCriteria::default().with_sort(SortKey::DistanceAsc);
        let ranked = rank_listings(&listings, Some(&viewer()), &by_distance);
        assert_eq!(ids(&ranked), vec!["ok", "broken", "far-north"]);
        assert!(ranked[1].distance_km.is_infinite());

        let bounded = by_distance.clone().with_radius(10_000.0);
        let ranked = rank_listings(&listings, Some(&viewer()), &bounded);
        assert_eq!(ids(&ranked), vec!["ok"]);
    }

    #[test]
    fn antipodal_listing_sorts_after_nearby_one() {
        let viewer = GeoLocation::new(-87.5, 0.0);
        let listings = vec![
            listing("antipode", "Tomato", 1.0, 87.5, 180.0, T),
            listing("near", "Tomato", 1.0, -87.4, 0.0, T),
        ];
        let by_distance = RankingCriteria::default().with_sort(SortKey::DistanceAsc);
        let ranked = rank_listings(&listings, Some(&viewer), &by_distance);
        assert_eq!(ids(&ranked), vec!["near", "antipode"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_finite()));

        let unbounded = by_distance.with_radius(f64::INFINITY);
        assert_eq!(rank_listings(&listings, Some(&viewer), &unbounded).len(), 2);
    }

    #[test]
    fn status_filter() {
        let mut sold = listing("sold", "Spinach", 40.0, 23.8, 90.3, T);
        sold.status = ListingStatus::Sold;
        let listings = vec![sold, listing("open", "Lettuce", 60.0, 23.8, 90.3, T)];

        let all = rank_listings(&listings, Some(&viewer()), &RankingCriteria::default());
        assert_eq!(all.len(), 2);

        let criteria = RankingCriteria::default().with_status(ListingStatus::Available);
        let ranked = rank_listings(&listings, Some(&viewer()), &criteria);
        assert_eq!(ids(&ranked), vec!["open"]);
    }

    #[test]
    fn input_is_untouched() {
        let listings = vec![
            listing("a", "A", 3.0, 23.8, 90.3, T),
            listing("b", "B", 1.0, 23.8, 90.3, T + 1),
        ];
        let before = listings.clone();
        let criteria = RankingCriteria::default().with_sort(SortKey::PriceAsc);
        let first = ids(&rank_listings(&listings, Some(&viewer()), &criteria));
        let second = ids(&rank_listings(&listings, Some(&viewer()), &criteria));
        assert_eq!(first, second);
        assert_eq!(listings, before);
    }

    #[test]
    fn sort_key_codes() {
        assert_eq!("price-low".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("Distance".parse::<SortKey>().unwrap(), SortKey::DistanceAsc);
        assert!("cheapest".parse::<SortKey>().is_err());
        assert_eq!(serde_json::to_string(&SortKey::PriceDesc).unwrap(), "\"price-high\"");
    }

    #[test]
    fn ranked_listing_serializes_flat_with_distance() {
        let listings = vec![listing("a", "Tomato", 1.0, 23.8103, 90.3563, T)];
        let ranked = rank_listings(&listings, Some(&viewer()), &RankingCriteria::default());
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["cropName"], "Tomato");
        assert_eq!(json["distanceKm"], 0.0);
    }
}
