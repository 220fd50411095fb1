//! Harvest command-line marketplace.
//!
//! Reads a JSON snapshot of profiles and listings, then either ranks listings
//! for a viewer, shows one listing's detail page, or applies a profile action
//! (post, sold, delete, profile edit) and writes the snapshot back.

mod render;
mod sample;
mod store;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use harvest_common::areas::{area_names, canonical_area_name, lookup_area};
use harvest_common::currency::{Currency, Unit};
use harvest_common::listing::now_ms;
use harvest_common::market::ListingDraft;
use harvest_common::{
    rank_listings, GeoLocation, ListingId, ListingStatus, MarketState, Profile, ProfileId,
    ProfileUpdate, RankedListing, RankingCriteria, SortKey,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "harvest", about = "Browse and manage local produce listings")]
struct Cli {
    /// Snapshot file holding profiles and listings.
    #[arg(long, env = "HARVEST_DATA", default_value = "harvest.json", global = true)]
    data: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sample growers and listings to the data file.
    Sample {
        /// Overwrite an existing data file.
        #[arg(long)]
        force: bool,
    },
    /// Show listings ranked for a viewer.
    Browse(BrowseArgs),
    /// Show your own listings with counters.
    Mine {
        #[arg(long = "as", value_name = "PROFILE")]
        as_profile: String,
        #[arg(long)]
        status: Option<ListingStatus>,
    },
    /// Post a new listing at your profile's location.
    Post(PostArgs),
    /// Mark one of your listings as sold.
    Sold {
        #[arg(long = "as", value_name = "PROFILE")]
        as_profile: String,
        id: String,
    },
    /// Delete one of your listings.
    Delete {
        #[arg(long = "as", value_name = "PROFILE")]
        as_profile: String,
        id: String,
    },
    /// Show one listing's detail page. Without --as, as an anonymous visitor.
    Show {
        #[arg(long = "as", value_name = "PROFILE")]
        as_profile: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
        id: String,
    },
    /// Edit your username, phone or avatar.
    Profile(ProfileArgs),
}

#[derive(Args, Debug)]
struct BrowseArgs {
    /// View as a registered profile, from its home location.
    #[arg(long = "as", value_name = "PROFILE", conflicts_with_all = ["area", "lat"])]
    as_profile: Option<String>,

    /// View as a guest from a named area.
    #[arg(long, conflicts_with = "lat")]
    area: Option<String>,

    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Case-insensitive crop name filter.
    #[arg(long)]
    search: Option<String>,

    /// Maximum distance in km (inclusive).
    #[arg(long)]
    radius: Option<f64>,

    /// newest, distance, price-low or price-high.
    #[arg(long, default_value_t = SortKey::Newest)]
    sort: SortKey,

    #[arg(long)]
    status: Option<ListingStatus>,

    /// Print JSON instead of text cards.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PostArgs {
    #[arg(long = "as", value_name = "PROFILE")]
    as_profile: String,
    #[arg(long)]
    crop: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value_t = Currency::Bdt)]
    currency: Currency,
    #[arg(long)]
    quantity: f64,
    #[arg(long, default_value_t = Unit::Kg)]
    unit: Unit,
    #[arg(long, default_value = "")]
    description: String,
    /// Link to more details elsewhere.
    #[arg(long, default_value = "")]
    link: String,
    /// Image URL or data URI; repeat for more images.
    #[arg(long = "image", value_name = "URL")]
    images: Vec<String>,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long = "as", value_name = "PROFILE")]
    as_profile: String,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Whether signed-in buyers see your phone (true or false).
    #[arg(long, value_name = "BOOL")]
    phone_visible: Option<bool>,
    #[arg(long)]
    avatar: Option<String>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let now = now_ms();
    match cli.command {
        Command::Sample { force } => {
            if cli.data.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.data.display());
            }
            let market = MarketState::from(sample::sample_snapshot(now));
            store::save(&cli.data, &market)?;
            println!("Wrote sample market to {}", cli.data.display());
        }
        Command::Browse(args) => {
            let market = store::load(&cli.data)?;
            browse(&market, &args, now)?;
        }
        Command::Mine { as_profile, status } => {
            let market = store::load(&cli.data)?;
            let owner = ProfileId(as_profile);
            if market.profile(&owner).is_none() {
                bail!("unknown profile: {owner}");
            }
            println!("{}", render::stats_line(&market.owner_stats(&owner)));
            for listing in market.owner_listings(&owner, status) {
                println!("{}", render::card(&market, listing, Some(0.0), now));
            }
        }
        Command::Post(args) => {
            let mut market = store::load(&cli.data)?;
            let draft = ListingDraft {
                crop_name: args.crop,
                price: args.price,
                currency: args.currency,
                quantity: args.quantity,
                unit: args.unit,
                description: args.description,
                images: args.images,
                external_link: args.link,
            };
            let id = market
                .create_listing(&ProfileId(args.as_profile), draft, now)?
                .id
                .clone();
            store::save(&cli.data, &market)?;
            println!("Posted {id}");
        }
        Command::Sold { as_profile, id } => {
            let mut market = store::load(&cli.data)?;
            let id = ListingId(id);
            market.mark_sold(&ProfileId(as_profile), &id)?;
            store::save(&cli.data, &market)?;
            println!("Marked {id} as sold");
        }
        Command::Delete { as_profile, id } => {
            let mut market = store::load(&cli.data)?;
            let removed = market.delete_listing(&ProfileId(as_profile), &ListingId(id))?;
            store::save(&cli.data, &market)?;
            println!("Deleted {} ({})", removed.id, removed.crop_name);
        }
        Command::Show {
            as_profile,
            json,
            id,
        } => {
            let market = store::load(&cli.data)?;
            let viewer = as_profile.map(ProfileId);
            let view = market.listing_detail(viewer.as_ref(), &ListingId(id))?;
            if json {
                let out = serde_json::to_string_pretty(&view).context("serializing listing")?;
                println!("{out}");
            } else {
                println!("{}", render::detail(&view, now));
            }
        }
        Command::Profile(args) => {
            let mut market = store::load(&cli.data)?;
            let update = ProfileUpdate {
                username: args.username,
                phone: args.phone,
                phone_visible: args.phone_visible,
                avatar: args.avatar,
            };
            let profile = market.update_profile(&ProfileId(args.as_profile), update)?;
            let phone = match (profile.phone.as_str(), profile.phone_visible) {
                ("", _) => "no phone".to_string(),
                (phone, true) => format!("{phone} (shown)"),
                (phone, false) => format!("{phone} (hidden)"),
            };
            println!("{} in {}: {phone}", profile.username, profile.area_name);
            store::save(&cli.data, &market)?;
        }
    }
    Ok(())
}

/// The registered profile named by `--as`, or a guest at `--area` or `--lat/--lng`.
fn viewer(market: &MarketState, args: &BrowseArgs) -> Result<Profile> {
    if let Some(profile) = &args.as_profile {
        let id = ProfileId(profile.clone());
        return market
            .profile(&id)
            .cloned()
            .with_context(|| format!("unknown profile: {id}"));
    }
    let location = if let Some(area) = &args.area {
        lookup_area(area).with_context(|| {
            let known: Vec<_> = area_names().collect();
            format!("unknown area {area:?} (known: {})", known.join(", "))
        })?
    } else {
        match (args.lat, args.lng) {
            (Some(lat), Some(lng)) => GeoLocation::new(lat, lng),
            _ => bail!("choose a viewer with --as, --area or --lat/--lng"),
        }
    };
    Ok(Profile::guest(location))
}

fn criteria(args: &BrowseArgs) -> RankingCriteria {
    RankingCriteria {
        search_text: args.search.clone(),
        radius_km: args.radius,
        sort: args.sort,
        status: args.status,
    }
}

fn browse(market: &MarketState, args: &BrowseArgs, now: i64) -> Result<()> {
    let viewer = viewer(market, args)?;
    let origin = viewer.location;
    if !origin.is_valid() {
        tracing::warn!(lat = origin.lat, lng = origin.lng, "viewer origin is malformed");
    }
    tracing::debug!(viewer = %viewer.id, guest = viewer.is_guest, "ranking listings");
    let ranked: Vec<RankedListing<'_>> =
        rank_listings(market.listings(), Some(&origin), &criteria(args));

    if args.json {
        let out = serde_json::to_string_pretty(&ranked).context("serializing listings")?;
        println!("{out}");
        return Ok(());
    }

    if let Some(area) = args.area.as_deref().and_then(canonical_area_name) {
        println!("Viewing from {area}");
    }
    if ranked.is_empty() {
        println!("No listings found.");
    }
    for r in &ranked {
        println!("{}", render::card(market, r.listing, Some(r.distance_km), now));
    }
    Ok(())
}
