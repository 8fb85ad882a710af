//! Server configuration and environment variable handling.

use std::env;
use std::path::PathBuf;

/// Default upstream page size for the properties collection.
pub const DEFAULT_PAGE_LIMIT: usize = 200;

/// Default upstream page size for the lease-spaces collection.
pub const DEFAULT_LEASE_SPACE_PAGE_LIMIT: usize = 1000;

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind host
    pub host: String,
    /// Server bind port
    pub port: u16,
    /// Base URL of the upstream listings API
    pub upstream_base_url: String,
    /// Shared secret for the manual refresh endpoint; empty disables refresh
    pub refresh_token: String,
    /// Directory holding the durable snapshot file
    pub data_dir: PathBuf,
    /// Page size used when paginating the upstream properties collection
    pub page_limit: usize,
    /// Page size used when paginating the upstream lease-spaces collection
    pub lease_space_page_limit: usize,
}

impl Config {
    /// Create a new configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `UPSTREAM_BASE_URL` (required): Base URL of the upstream listings API
    /// - `HOST` (optional, default: 0.0.0.0): Server bind host
    /// - `PORT` (optional, default: 3000): Server bind port
    /// - `REFRESH_TOKEN` (optional): Shared secret for POST /api/refresh;
    ///   when unset the endpoint always rejects
    /// - `DATA_DIR` (optional): Snapshot directory; when unset, prefers the
    ///   `/data` mount if present, else `./data`
    ///
    /// # Errors
    /// Returns an error if required variables are not set or malformed.
    pub fn from_env() -> Result<Self, String> {
        let upstream_base_url = env::var("UPSTREAM_BASE_URL")
            .map_err(|_| "UPSTREAM_BASE_URL environment variable not set".to_string())?;
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid port number".to_string())?;
        let refresh_token = env::var("REFRESH_TOKEN").unwrap_or_default();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        Ok(Self {
            host,
            port,
            upstream_base_url: upstream_base_url.trim_end_matches('/').to_string(),
            refresh_token,
            data_dir,
            page_limit: DEFAULT_PAGE_LIMIT,
            lease_space_page_limit: DEFAULT_LEASE_SPACE_PAGE_LIMIT,
        })
    }
}

/// Prefer a mounted persistent volume when present, else a local directory.
pub fn default_data_dir() -> PathBuf {
    let mounted = PathBuf::from("/data");
    if mounted.is_dir() {
        mounted
    } else {
        PathBuf::from("data")
    }
}
