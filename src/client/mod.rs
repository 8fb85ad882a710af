//! Consumer-side loader and application state.
//!
//! This is the front-end half of the pipeline: it fetches the three proxy
//! collections concurrently, keeps a session-scoped cache of the raw payloads
//! so re-entering the table within a session does not refetch, and owns the
//! working set plus the filter state explicitly (one controller object, no
//! ambient globals).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{error, warn};

use crate::models::{Broker, LeaseSpace, Listing};
use crate::services::aggregate::{build_working_set, AggregateOptions, EnrichedListing};
use crate::services::query::{self, FilterState, ListingType, SortKey};
use crate::services::url_state;

/// Page size when paginating the proxy's listings endpoint.
pub const PAGE_SIZE: usize = 30;

/// Delay between listing pages, to stay under provider rate limits.
pub const PAGE_DELAY: Duration = Duration::from_millis(1_250);

/// Per-request wall-clock timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Debounce applied by the embedding UI to search input before re-querying.
pub const SEARCH_DEBOUNCE_MS: u64 = 180;

/// Session cache keys; bump the version suffix to invalidate old sessions.
pub const LISTINGS_CACHE_KEY: &str = "listings:v1";
pub const LEASE_SPACES_CACHE_KEY: &str = "lease_spaces:v1";

/// Query parameter that forces a session-cache bypass.
pub const BYPASS_CACHE_PARAM: &str = "nocache";

/// Whether the page URL asks for a cache bypass (`?nocache` or `?nocache=1`).
pub fn bypass_requested(query: &str) -> bool {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes()).any(|(key, value)| {
        key == BYPASS_CACHE_PARAM && !matches!(value.as_ref(), "0" | "false")
    })
}

/// Failure talking to the proxy.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("proxy returned HTTP {status}")]
    Status { status: u16 },

    #[error("proxy request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("proxy payload was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Session-scoped cache of raw payloads, keyed by versioned name.
#[derive(Clone, Default)]
pub struct SessionCache {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: Value) {
        self.entries.write().insert(key.to_string(), value);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Options for a working-set load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Skip the session cache and refetch everything
    pub bypass_cache: bool,
    /// Forwarded to the aggregation engine
    pub aggregate: AggregateOptions,
}

/// HTTP client for the proxy's JSON surface.
#[derive(Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    /// Create a client rooted at the proxy's `/api` base (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(LoadError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all listing pages, honoring the session cache.
    ///
    /// Pages with `limit`/`offset` and stops once the reported total count is
    /// reached (or a short page arrives, for safety against a lying count).
    pub async fn fetch_all_listings(
        &self,
        cache: &SessionCache,
        bypass_cache: bool,
    ) -> Result<Vec<Listing>, LoadError> {
        if !bypass_cache {
            if let Some(cached) = cache.get(LISTINGS_CACHE_KEY) {
                if let Ok(listings) = serde_json::from_value::<Vec<Listing>>(cached) {
                    if !listings.is_empty() {
                        return Ok(listings);
                    }
                }
            }
        }

        let mut raw: Vec<Value> = Vec::new();
        let mut offset = 0usize;
        let mut total: Option<u64> = None;

        loop {
            let url = format!(
                "{}/listings?limit={}&offset={}",
                self.base_url, PAGE_SIZE, offset
            );
            let page = self.get_json(&url).await?;

            if total.is_none() {
                total = page.get("count").and_then(Value::as_u64);
            }
            let batch = page
                .get("properties")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let batch_len = batch.len();
            raw.extend(batch);

            let done = match total {
                Some(total) => raw.len() as u64 >= total,
                None => true,
            };
            if done || batch_len < PAGE_SIZE {
                break;
            }

            offset += PAGE_SIZE;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        cache.put(LISTINGS_CACHE_KEY, Value::Array(raw.clone()));

        Ok(raw
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect())
    }

    /// Fetch the brokers collection.
    pub async fn fetch_brokers(&self) -> Result<Vec<Broker>, LoadError> {
        let body = self.get_json(&format!("{}/brokers", self.base_url)).await?;
        let brokers = body
            .get("brokers")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(brokers
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect())
    }

    /// Fetch the lease-spaces collection, honoring the session cache.
    pub async fn fetch_lease_spaces(
        &self,
        cache: &SessionCache,
        bypass_cache: bool,
    ) -> Result<Vec<LeaseSpace>, LoadError> {
        if !bypass_cache {
            if let Some(cached) = cache.get(LEASE_SPACES_CACHE_KEY) {
                if let Ok(spaces) = serde_json::from_value::<Vec<LeaseSpace>>(cached) {
                    if !spaces.is_empty() {
                        return Ok(spaces);
                    }
                }
            }
        }

        let body = self
            .get_json(&format!("{}/lease_spaces", self.base_url))
            .await?;
        let raw = body
            .get("lease_spaces")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        cache.put(LEASE_SPACES_CACHE_KEY, Value::Array(raw.clone()));

        Ok(raw
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect())
    }

    /// Load everything and build the working set.
    ///
    /// The three collections fetch concurrently. A failed brokers or
    /// lease-spaces fetch degrades the affected fields; a failed listings
    /// fetch (the only required collection) yields an empty working set.
    pub async fn load_working_set(
        &self,
        cache: &SessionCache,
        opts: LoadOptions,
    ) -> Vec<EnrichedListing> {
        let (listings, brokers, spaces) = tokio::join!(
            self.fetch_all_listings(cache, opts.bypass_cache),
            self.fetch_brokers(),
            self.fetch_lease_spaces(cache, opts.bypass_cache),
        );

        let listings = match listings {
            Ok(listings) => listings,
            Err(err) => {
                error!(error = %err, "failed to load listings, serving empty working set");
                return Vec::new();
            }
        };
        let brokers = brokers.unwrap_or_else(|err| {
            warn!(error = %err, "failed to load brokers, listings will have no broker chips");
            Vec::new()
        });
        let spaces = spaces.unwrap_or_else(|err| {
            warn!(error = %err, "failed to load lease spaces, available SF will be empty");
            Vec::new()
        });

        build_working_set(&listings, &brokers, &spaces, opts.aggregate)
    }

    async fn get_json(&self, url: &str) -> Result<Value, LoadError> {
        let response = self.http.get(url).send().await.map_err(LoadError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(LoadError::Decode)
    }
}

/// Top-level controller owning the working set and the filter state.
///
/// The working set is replaced atomically once a load resolves; filter and
/// sort interaction in between operates on whatever set is current.
#[derive(Default)]
pub struct App {
    working_set: Vec<EnrichedListing>,
    state: FilterState,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working set wholesale (after a completed load).
    pub fn replace_working_set(&mut self, working_set: Vec<EnrichedListing>) {
        self.working_set = working_set;
    }

    pub fn working_set(&self) -> &[EnrichedListing] {
        &self.working_set
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn set_type_filter(&mut self, property_type: Option<String>) {
        self.state.property_type = property_type;
    }

    pub fn set_listing_type(&mut self, listing_type: Option<ListingType>) {
        self.state.listing_type = listing_type;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.state.search = search.into();
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.state.toggle_sort(key);
    }

    /// Adopt state from an incoming URL (query string plus legacy fragment).
    pub fn apply_url(&mut self, query: &str, fragment: Option<&str>) {
        let sort = self.state.sort;
        self.state = url_state::decode_with_fragment(query, fragment);
        self.state.sort = sort;
    }

    /// Serialize the current state back to URL query parameters.
    pub fn url_query(&self) -> String {
        url_state::encode(&self.state)
    }

    /// The filtered/sorted view the table renders.
    pub fn visible(&self) -> Vec<&EnrichedListing> {
        query::apply(&self.working_set, &self.state)
    }
}
