use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::areas::{canonical_area_name, lookup_area};
use crate::location::GeoLocation;

/// Opaque profile identifier issued by the authentication provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        ProfileId(s.to_string())
    }
}

/// A registered user (or a browsing guest) and their home location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub username: String,
    #[serde(default)]
    pub area_name: String,
    pub location: GeoLocation,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    /// Whether other signed-in users may see `phone` on a listing.
    #[serde(default = "phone_visible_default")]
    pub phone_visible: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    /// Registration time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Document fields this crate does not model (friend lists and the like).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn phone_visible_default() -> bool {
    true
}

impl Profile {
    fn blank(id: ProfileId, username: String, location: GeoLocation) -> Self {
        Self {
            id,
            username,
            area_name: String::new(),
            location,
            is_guest: false,
            email: String::new(),
            phone: String::new(),
            phone_visible: true,
            avatar: String::new(),
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Build a profile located at the centroid of a known area.
    /// Returns None if the area is not in the table. The stored area name
    /// uses the table's spelling.
    pub fn in_area(id: impl Into<String>, username: impl Into<String>, area: &str) -> Option<Self> {
        let location = lookup_area(area)?;
        let mut profile = Self::blank(ProfileId(id.into()), username.into(), location);
        profile.area_name = canonical_area_name(area)?.to_string();
        Some(profile)
    }

    /// A guest browsing from the given location. Guests cannot post or sell.
    pub fn guest(location: GeoLocation) -> Self {
        let mut profile = Self::blank(ProfileId("guest".into()), "Guest".into(), location);
        profile.is_guest = true;
        profile
    }

    /// The phone number to show another viewer, if the owner shares it.
    pub fn shared_phone(&self) -> Option<&str> {
        (self.phone_visible && !self.phone.is_empty()).then_some(self.phone.as_str())
    }
}
