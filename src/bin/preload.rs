//! One-shot snapshot warmer.
//!
//! Fetches the full properties collection and writes the disk snapshot, then
//! exits. Useful at deploy time so the server's first boot already has data.
//! Exits non-zero when the fetch fails so deploy scripts can gate on it.

use std::env;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use listings_proxy::config::Config;
use listings_proxy::services::refresh::RefreshController;
use listings_proxy::store::SnapshotStore;
use listings_proxy::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let store = SnapshotStore::new(config.data_dir.clone());
    let upstream = UpstreamClient::new(config.upstream_base_url.clone())
        .map_err(|e| anyhow::anyhow!(e))?;
    let refresh = RefreshController::new(
        upstream,
        store,
        config.refresh_token.clone(),
        config.page_limit,
    );

    let outcome = refresh.refresh_now().await?;
    info!(count = outcome.count, "listings preloaded into snapshot");

    Ok(())
}
