//! Listings Proxy Server Binary
//!
//! Entry point for the proxy server: primes the snapshot store from disk,
//! kicks off an initial upstream refresh, and starts serving the JSON API.
//!
//! # Usage
//!
//! ```bash
//! UPSTREAM_BASE_URL=https://api.example.com/v1/<key> \
//!   REFRESH_TOKEN=change-me \
//!   cargo run --bin listings-server
//! ```
//!
//! # Environment Variables
//!
//! - `UPSTREAM_BASE_URL`: Base URL of the upstream listings API (required)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `REFRESH_TOKEN`: Secret for POST /api/refresh (unset: endpoint rejects)
//! - `DATA_DIR`: Snapshot directory (default: /data if mounted, else ./data)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use listings_proxy::config::Config;
use listings_proxy::http::{create_router, AppState};
use listings_proxy::services::refresh::RefreshController;
use listings_proxy::store::SnapshotStore;
use listings_proxy::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting listings proxy server");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Disk snapshot loads before the listener opens: cold boot never serves
    // empty if any snapshot was ever written
    let store = SnapshotStore::new(config.data_dir.clone());
    let primed = store.prime_from_disk();
    if primed > 0 {
        info!(count = primed, "boot: serving disk snapshot");
    }

    let upstream = UpstreamClient::new(config.upstream_base_url.clone())
        .map_err(|e| anyhow::anyhow!(e))?;
    let refresh = Arc::new(RefreshController::new(
        upstream.clone(),
        store.clone(),
        config.refresh_token.clone(),
        config.page_limit,
    ));

    // Initial refresh; a failure here is logged and the last-good (possibly
    // empty) snapshot keeps serving
    if let Err(err) = refresh.refresh_now().await {
        error!(error = %err, "initial refresh failed, serving existing snapshot");
    }

    let state = AppState::new(
        store,
        upstream,
        refresh,
        config.lease_space_page_limit,
    );
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Proxy server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
