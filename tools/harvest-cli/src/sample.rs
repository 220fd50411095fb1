use harvest_common::currency::{Currency, Unit};
use harvest_common::{Listing, ListingId, ListingStatus, MarketSnapshot, Profile};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

struct SampleProfile {
    id: &'static str,
    username: &'static str,
    area: &'static str,
    email: &'static str,
    phone: &'static str,
    phone_visible: bool,
    joined_days_ago: i64,
}

struct SampleListing {
    owner: usize,
    crop: &'static str,
    price: f64,
    quantity: f64,
    unit: Unit,
    description: &'static str,
    status: ListingStatus,
    age_hours: i64,
}

const SAMPLE_PROFILES: &[SampleProfile] = &[
    SampleProfile {
        id: "user1",
        username: "FarmerAli",
        area: "Mirpur-1",
        email: "farmer_ali@test.com",
        phone: "+8801711111111",
        phone_visible: true,
        joined_days_ago: 30,
    },
    SampleProfile {
        id: "user2",
        username: "RooftopHassan",
        area: "Mirpur-14",
        email: "rooftop_hassan@test.com",
        phone: "+8801722222222",
        phone_visible: false,
        joined_days_ago: 25,
    },
    SampleProfile {
        id: "user3",
        username: "UrbanGardener",
        area: "Dhanmondi",
        email: "urban_garden@test.com",
        phone: "+8801733333333",
        phone_visible: true,
        joined_days_ago: 20,
    },
];

const SAMPLE_LISTINGS: &[SampleListing] = &[
    SampleListing {
        owner: 0,
        crop: "Organic Tomatoes",
        price: 150.0,
        quantity: 5.0,
        unit: Unit::Kg,
        description: "Fresh organic tomatoes from my rooftop garden. Pesticide-free!",
        status: ListingStatus::Available,
        age_hours: 2,
    },
    SampleListing {
        owner: 0,
        crop: "Green Chilies",
        price: 80.0,
        quantity: 500.0,
        unit: Unit::G,
        description: "Spicy green chilies, perfect for cooking",
        status: ListingStatus::Available,
        age_hours: 5,
    },
    SampleListing {
        owner: 1,
        crop: "Lettuce",
        price: 60.0,
        quantity: 10.0,
        unit: Unit::Piece,
        description: "Hydroponic lettuce, fresh and crispy",
        status: ListingStatus::Available,
        age_hours: 12,
    },
    SampleListing {
        owner: 1,
        crop: "Spinach",
        price: 40.0,
        quantity: 3.0,
        unit: Unit::Bunch,
        description: "Fresh spinach bunches",
        status: ListingStatus::Sold,
        age_hours: 24,
    },
    SampleListing {
        owner: 2,
        crop: "Bell Peppers",
        price: 120.0,
        quantity: 2.0,
        unit: Unit::Kg,
        description: "Red and yellow bell peppers, sweet and crunchy",
        status: ListingStatus::Available,
        age_hours: 8,
    },
    SampleListing {
        owner: 2,
        crop: "Cherry Tomatoes",
        price: 200.0,
        quantity: 1.0,
        unit: Unit::Kg,
        description: "Sweet cherry tomatoes, perfect for salads",
        status: ListingStatus::Available,
        age_hours: 3,
    },
];

/// Three growers in Dhaka and six listings aged relative to `now_ms`.
pub fn sample_snapshot(now_ms: i64) -> MarketSnapshot {
    let profiles: Vec<Profile> = SAMPLE_PROFILES
        .iter()
        .filter_map(|s| {
            let mut profile = Profile::in_area(s.id, s.username, s.area)?;
            profile.email = s.email.to_string();
            profile.phone = s.phone.to_string();
            profile.phone_visible = s.phone_visible;
            profile.created_at = Some(now_ms - s.joined_days_ago * DAY_MS);
            Some(profile)
        })
        .collect();

    let listings = SAMPLE_LISTINGS
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let owner = profiles.get(s.owner)?;
            Some(Listing {
                id: ListingId(format!("id_sample_{}", i + 1)),
                owner_id: owner.id.clone(),
                crop_name: s.crop.to_string(),
                price: s.price,
                currency: Currency::Bdt,
                quantity: s.quantity,
                unit: s.unit,
                description: s.description.to_string(),
                area_name: owner.area_name.clone(),
                location: owner.location,
                status: s.status,
                created_at: now_ms - s.age_hours * HOUR_MS,
                ..Default::default()
            })
        })
        .collect();

    MarketSnapshot { profiles, listings }
}
