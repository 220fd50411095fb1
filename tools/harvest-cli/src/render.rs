use harvest_common::currency::format_price;
use harvest_common::listing::{format_distance, relative_time};
use harvest_common::market::OwnerStats;
use harvest_common::{Listing, ListingDetail, ListingStatus, MarketState};

/// One listing as a short text card.
pub fn card(market: &MarketState, listing: &Listing, distance_km: Option<f64>, now_ms: i64) -> String {
    let area = match listing.area_name.as_str() {
        "" => String::new(),
        name => format!(" | {name}"),
    };
    let distance = distance_km
        .map(|km| format!(" | {}", format_distance(km)))
        .unwrap_or_default();
    format!(
        "[{}] {} - {}\n    {} {}{area}{distance} | {} | {}\n    id: {}",
        listing.status.label(),
        listing.crop_name,
        format_price(listing.price, listing.currency),
        listing.quantity,
        listing.unit,
        market.owner_name(&listing.owner_id),
        relative_time(listing.created_at, now_ms),
        listing.id,
    )
}

/// The full detail page of a listing, including seller contact and the
/// actions open to the viewer.
pub fn detail(detail: &ListingDetail<'_>, now_ms: i64) -> String {
    let listing = detail.listing;
    let mut lines = vec![
        format!(
            "[{}] {} - {}",
            listing.status.label(),
            listing.crop_name,
            format_price(listing.price, listing.currency)
        ),
        format!(
            "{} {} | {} | {}",
            listing.quantity,
            listing.unit,
            listing.area_name,
            relative_time(listing.created_at, now_ms)
        ),
    ];
    if !listing.description.is_empty() {
        lines.push(listing.description.clone());
    }
    lines.push(format!(
        "Seller: {} ({}) | {}",
        detail.seller_name,
        detail.seller_area,
        detail.seller_phone.unwrap_or("Phone hidden")
    ));
    if let Some(km) = detail.distance_km {
        lines.push(format!("Distance: {}", format_distance(km)));
    }
    if !listing.external_link.is_empty() {
        lines.push(format!("Link: {}", listing.external_link));
    }
    if !listing.images.is_empty() {
        lines.push(format!("Images: {}", listing.images.len()));
    }

    let mut actions = Vec::new();
    if detail.can_mark_sold {
        actions.push("mark sold");
    }
    if detail.can_delete {
        actions.push("delete");
    }
    if detail.can_contact {
        actions.push("contact seller");
    } else if !detail.is_owner && listing.status != ListingStatus::Sold {
        actions.push("sign in to contact");
    }
    if !actions.is_empty() {
        lines.push(format!("Actions: {}", actions.join(", ")));
    }
    lines.push(format!("id: {}", listing.id));
    lines.join("\n    ")
}

pub fn stats_line(stats: &OwnerStats) -> String {
    format!(
        "{} listings: {} available, {} sold",
        stats.total, stats.available, stats.sold
    )
}
