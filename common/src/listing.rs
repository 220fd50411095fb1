use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::currency::{Currency, Unit};
use crate::location::GeoLocation;
use crate::profile::ProfileId;
use crate::ParseError;

/// Opaque listing identifier assigned by the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        ListingId(s.to_string())
    }
}

/// Listing status. Moves forward only; nothing returns to `Available`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl ListingStatus {
    /// Returns true if transitioning from self to `next` is valid.
    pub fn can_transition_to(&self, next: &ListingStatus) -> bool {
        matches!(
            (self, next),
            (ListingStatus::Available, ListingStatus::Reserved)
                | (ListingStatus::Available, ListingStatus::Sold)
                | (ListingStatus::Reserved, ListingStatus::Sold)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Available => "Available",
            ListingStatus::Reserved => "Reserved",
            ListingStatus::Sold => "SOLD",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Reserved => "reserved",
            ListingStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ListingStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(ListingStatus::Available),
            "reserved" => Ok(ListingStatus::Reserved),
            "sold" => Ok(ListingStatus::Sold),
            _ => Err(ParseError::new("status", s)),
        }
    }
}

/// A crop offered for sale by a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: ProfileId,
    pub crop_name: String,
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub area_name: String,
    /// Copied from the owner's profile when posted; never updated.
    pub location: GeoLocation,
    #[serde(default)]
    pub status: ListingStatus,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Image URLs or data URIs; the first one is the card picture.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_link: String,
    #[serde(default)]
    pub views: u64,
    /// Document fields this crate does not model, kept so a rewrite loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn is_owned_by(&self, profile: &ProfileId) -> bool {
        self.owner_id == *profile
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Current time in epoch milliseconds.
#[cfg(feature = "std")]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Human-readable age such as "3 hours ago". Future timestamps read as "Just now".
pub fn relative_time(created_at_ms: i64, now_ms: i64) -> String {
    let age = Duration::milliseconds(now_ms.saturating_sub(created_at_ms).max(0));
    let plural = |n: i64, unit: &str| format!("{n} {unit}{} ago", if n > 1 { "s" } else { "" });

    if age.num_days() > 0 {
        plural(age.num_days(), "day")
    } else if age.num_hours() > 0 {
        plural(age.num_hours(), "hour")
    } else if age.num_minutes() > 0 {
        plural(age.num_minutes(), "minute")
    } else {
        "Just now".to_string()
    }
}

/// Distance for a card, one decimal place.
pub fn format_distance(km: f64) -> String {
    if km.is_finite() {
        format!("{km:.1} km")
    } else {
        "Distance unknown".to_string()
    }
}
