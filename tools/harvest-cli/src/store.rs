//! JSON snapshot file standing in for the document store.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use harvest_common::{MarketSnapshot, MarketState};

/// Load the market from `path`. A missing file is an empty market.
pub fn load(path: &Path) -> Result<MarketState> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "data file not found, starting empty");
        return Ok(MarketState::default());
    }
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = MarketSnapshot::from_json(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(
        profiles = snapshot.profiles.len(),
        listings = snapshot.listings.len(),
        "loaded snapshot"
    );
    Ok(MarketState::from(snapshot))
}

/// Write the market to `path`, replacing it atomically via a sibling temp file.
pub fn save(path: &Path, market: &MarketState) -> Result<()> {
    let json = market
        .snapshot()
        .to_json_pretty()
        .context("serializing snapshot")?;

    let tmp = path.with_extension("json.tmp");
    {
        let mut file =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .with_context(|| format!("writing {}", tmp.display()))?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved snapshot");
    Ok(())
}
