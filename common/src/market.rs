use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::currency::{Currency, Unit};
use crate::listing::{Listing, ListingId, ListingStatus};
use crate::profile::{Profile, ProfileId};
use crate::ranker::{rank_listings, RankedListing, RankingCriteria};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarketError {
    #[error("unknown profile: {0}")]
    UnknownProfile(ProfileId),

    #[error("guests cannot {0}")]
    GuestNotAllowed(&'static str),

    #[error("listing not found: {0}")]
    NotFound(ListingId),

    #[error("only the owner can {action} listing {id}")]
    NotOwner { action: &'static str, id: ListingId },

    #[error("listing {0} is already sold")]
    AlreadySold(ListingId),

    #[error("listing {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ListingId,
        from: ListingStatus,
        to: ListingStatus,
    },

    #[error("invalid listing: {0}")]
    Invalid(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// User input for a new listing. Location and area come from the owner's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
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
    pub images: Vec<String>,
    #[serde(default)]
    pub external_link: String,
}

impl ListingDraft {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.crop_name.trim().is_empty() {
            return Err(MarketError::Invalid("crop name must not be empty".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(MarketError::Invalid(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(MarketError::Invalid(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// Fields a signed-in user may change on their own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_visible: Option<bool>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A listing as one viewer sees it on its detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail<'a> {
    #[serde(flatten)]
    pub listing: &'a Listing,
    pub seller_name: &'a str,
    pub seller_area: &'a str,
    /// Only set for signed-in viewers when the seller shares a number.
    pub seller_phone: Option<&'a str>,
    pub is_owner: bool,
    pub can_contact: bool,
    pub can_mark_sold: bool,
    pub can_delete: bool,
    /// None for anonymous viewers or malformed coordinates.
    pub distance_km: Option<f64>,
}

/// Counters shown on the "my listings" page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnerStats {
    pub total: usize,
    pub available: usize,
    pub sold: usize,
}

/// Serialized form of the market as held by the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl MarketSnapshot {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// In-memory profiles and listings, newest listing first.
///
/// Mutations take `&mut self`; concurrent writers from other sessions are not
/// reconciled here.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    profiles: BTreeMap<ProfileId, Profile>,
    listings: Vec<Listing>,
    next_seq: u64,
}

impl From<MarketSnapshot> for MarketState {
    fn from(snapshot: MarketSnapshot) -> Self {
        let mut state = MarketState::default();
        for profile in snapshot.profiles {
            state.upsert_profile(profile);
        }
        state.listings = snapshot.listings;
        state
    }
}

impl MarketState {
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            profiles: self.profiles.values().cloned().collect(),
            listings: self.listings.clone(),
        }
    }

    pub fn upsert_profile(&mut self, profile: Profile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn profile(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn listing(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == *id)
    }

    /// Username for display; "Unknown" if the owner has no profile.
    pub fn owner_name(&self, id: &ProfileId) -> &str {
        self.profiles
            .get(id)
            .map(|p| p.username.as_str())
            .unwrap_or("Unknown")
    }

    fn next_id(&mut self, now_ms: i64) -> ListingId {
        loop {
            self.next_seq += 1;
            let id = ListingId(format!("id_{now_ms}_{}", self.next_seq));
            if self.listing(&id).is_none() {
                return id;
            }
        }
    }

    fn actor(&self, id: &ProfileId, action: &'static str) -> Result<&Profile, MarketError> {
        let profile = self
            .profiles
            .get(id)
            .ok_or_else(|| MarketError::UnknownProfile(id.clone()))?;
        if profile.is_guest {
            return Err(MarketError::GuestNotAllowed(action));
        }
        Ok(profile)
    }

    fn owned_index(
        &self,
        actor: &ProfileId,
        id: &ListingId,
        action: &'static str,
    ) -> Result<usize, MarketError> {
        self.actor(actor, action)?;
        let idx = self
            .listings
            .iter()
            .position(|l| l.id == *id)
            .ok_or_else(|| MarketError::NotFound(id.clone()))?;
        if !self.listings[idx].is_owned_by(actor) {
            return Err(MarketError::NotOwner {
                action,
                id: id.clone(),
            });
        }
        Ok(idx)
    }

    /// Post a new listing at the owner's current location.
    pub fn create_listing(
        &mut self,
        owner: &ProfileId,
        draft: ListingDraft,
        now_ms: i64,
    ) -> Result<&Listing, MarketError> {
        let profile = self.actor(owner, "post listings")?;
        draft.validate()?;
        let location = profile.location;
        let area_name = profile.area_name.clone();

        let id = self.next_id(now_ms);
        let listing = Listing {
            id,
            owner_id: owner.clone(),
            crop_name: draft.crop_name.trim().to_string(),
            price: draft.price,
            currency: draft.currency,
            quantity: draft.quantity,
            unit: draft.unit,
            description: draft.description,
            area_name,
            location,
            status: ListingStatus::Available,
            created_at: now_ms,
            images: draft.images,
            external_link: draft.external_link.trim().to_string(),
            views: 0,
            extra: Default::default(),
        };
        tracing::info!(listing = %listing.id, owner = %owner, crop = %listing.crop_name, "listing created");
        self.listings.insert(0, listing);
        Ok(&self.listings[0])
    }

    /// Change the actor's own username, phone, phone visibility or avatar.
    pub fn update_profile(
        &mut self,
        actor: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<&Profile, MarketError> {
        self.actor(actor, "edit a profile")?;
        let username = match update.username {
            Some(name) if name.trim().is_empty() => {
                return Err(MarketError::InvalidProfile("username must not be empty".into()));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };

        let profile = self
            .profiles
            .get_mut(actor)
            .ok_or_else(|| MarketError::UnknownProfile(actor.clone()))?;
        if let Some(username) = username {
            profile.username = username;
        }
        if let Some(phone) = update.phone {
            profile.phone = phone.trim().to_string();
        }
        if let Some(visible) = update.phone_visible {
            profile.phone_visible = visible;
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = avatar;
        }
        tracing::info!(profile = %actor, "profile updated");
        Ok(profile)
    }

    /// The detail page of one listing for `viewer`, or for an anonymous
    /// visitor when `viewer` is None.
    ///
    /// The seller's phone is only revealed to signed-in, non-guest viewers and
    /// only when the seller has `phone_visible` set. Nobody can contact the
    /// seller of a sold listing, and owners never contact themselves.
    pub fn listing_detail(
        &self,
        viewer: Option<&ProfileId>,
        id: &ListingId,
    ) -> Result<ListingDetail<'_>, MarketError> {
        let listing = self
            .listing(id)
            .ok_or_else(|| MarketError::NotFound(id.clone()))?;
        let viewer = viewer
            .map(|v| {
                self.profiles
                    .get(v)
                    .ok_or_else(|| MarketError::UnknownProfile(v.clone()))
            })
            .transpose()?;
        let seller = self.profiles.get(&listing.owner_id);

        let signed_in = viewer.is_some_and(|v| !v.is_guest);
        let is_owner = signed_in && viewer.is_some_and(|v| listing.is_owned_by(&v.id));
        let sold = listing.status == ListingStatus::Sold;

        Ok(ListingDetail {
            listing,
            seller_name: seller.map_or("Unknown", |p| p.username.as_str()),
            seller_area: seller.map_or("Unknown", |p| p.area_name.as_str()),
            seller_phone: seller
                .filter(|_| signed_in)
                .and_then(Profile::shared_phone),
            is_owner,
            can_contact: signed_in && !is_owner && !sold,
            can_mark_sold: is_owner && listing.status.can_transition_to(&ListingStatus::Sold),
            can_delete: is_owner,
            distance_km: viewer.and_then(|v| v.location.checked_distance_km(&listing.location).ok()),
        })
    }

    /// Owner-only transition to `Sold`.
    pub fn mark_sold(&mut self, actor: &ProfileId, id: &ListingId) -> Result<(), MarketError> {
        let idx = self.owned_index(actor, id, "mark sold")?;
        let listing = &mut self.listings[idx];
        if listing.status == ListingStatus::Sold {
            return Err(MarketError::AlreadySold(id.clone()));
        }
        if !listing.status.can_transition_to(&ListingStatus::Sold) {
            return Err(MarketError::InvalidTransition {
                id: id.clone(),
                from: listing.status,
                to: ListingStatus::Sold,
            });
        }
        listing.status = ListingStatus::Sold;
        tracing::info!(listing = %id, "listing marked sold");
        Ok(())
    }

    /// Owner-only removal. Returns the deleted listing.
    pub fn delete_listing(
        &mut self,
        actor: &ProfileId,
        id: &ListingId,
    ) -> Result<Listing, MarketError> {
        let idx = self.owned_index(actor, id, "delete")?;
        let removed = self.listings.remove(idx);
        tracing::info!(listing = %id, "listing deleted");
        Ok(removed)
    }

    /// The owner's own listings, optionally restricted to one status, in store order.
    pub fn owner_listings(
        &self,
        owner: &ProfileId,
        status: Option<ListingStatus>,
    ) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|l| l.is_owned_by(owner))
            .filter(|l| status.is_none_or(|s| l.status == s))
            .collect()
    }

    pub fn owner_stats(&self, owner: &ProfileId) -> OwnerStats {
        self.listings
            .iter()
            .filter(|l| l.is_owned_by(owner))
            .fold(OwnerStats::default(), |mut stats, l| {
                stats.total += 1;
                match l.status {
                    ListingStatus::Available => stats.available += 1,
                    ListingStatus::Sold => stats.sold += 1,
                    ListingStatus::Reserved => {}
                }
                stats
            })
    }

    /// Rank every listing for a known viewer. Unknown viewers see nothing.
    pub fn rank_for(
        &self,
        viewer: &ProfileId,
        criteria: &RankingCriteria,
    ) -> Vec<RankedListing<'_>> {
        let origin = self.profiles.get(viewer).map(|p| &p.location);
        rank_listings(&self.listings, origin, criteria)
    }
}
