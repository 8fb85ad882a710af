//! Paginated, rate-limited, retrying client for the upstream listings API.
//!
//! Three collections are served upstream: properties, brokers, and lease
//! spaces. Properties and lease spaces paginate; both termination signals seen
//! in the wild are supported (a reported total count, and a short final page
//! for endpoints whose count is unreliable). Transient failures (429, 5xx,
//! request timeout) retry with exponential backoff; any other failure is a
//! permanent client error and surfaces immediately.

pub mod backoff;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Broker, LeaseSpace, Listing};
use backoff::Backoff;

/// Fixed delay between successive page requests, to respect upstream rate limits.
pub const PAGE_DELAY: Duration = Duration::from_millis(1_000);

/// Wall-clock timeout for each individual page request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum attempts per request before a transient failure becomes permanent.
pub const MAX_ATTEMPTS: u32 = 6;

/// First retry delay in milliseconds.
pub const BASE_DELAY_MS: u64 = 800;

/// Growth factor applied to the retry delay per attempt.
pub const BACKOFF_FACTOR: f64 = 1.6;

/// Upper bound on the random jitter added to each retry delay.
pub const JITTER_MS: u64 = 250;

/// User agent presented to the upstream API.
pub const USER_AGENT: &str = "listings-proxy/1.0";

/// Upstream collection paths.
pub const PROPERTIES_PATH: &str = "properties.json";
pub const BROKERS_PATH: &str = "brokers.json";
pub const LEASE_SPACES_PATH: &str = "lease_spaces.json";

/// Failure fetching from upstream.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Upstream answered with a non-success HTTP status
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    /// The request exceeded its wall-clock timeout
    #[error("upstream request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("upstream request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// Body was not the JSON shape we expected
    #[error("upstream payload was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// Transient infrastructure failures retry; permanent client errors
    /// (4xx other than 429, undecodable bodies, refused connections) do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status } => *status == 429 || (500..=599).contains(status),
            FetchError::Timeout => true,
            FetchError::Network(_) | FetchError::Decode(_) => false,
        }
    }
}

/// One fetched page collection plus the total count the endpoint reported, if any.
#[derive(Debug, Clone)]
pub struct PagedCollection {
    pub records: Vec<Value>,
    pub reported_count: Option<u64>,
}

/// Client for the upstream listings API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every page of a collection endpoint.
    ///
    /// Requests `limit=page_size&offset=N`, concatenating batches found under
    /// `collection_key`, until either a page comes back shorter than
    /// `page_size` or the endpoint's reported total count has been reached.
    pub async fn fetch_all_pages(
        &self,
        path: &str,
        collection_key: &str,
        page_size: usize,
    ) -> Result<PagedCollection, FetchError> {
        let mut records: Vec<Value> = Vec::new();
        let mut reported_count: Option<u64> = None;
        let mut offset = 0usize;

        loop {
            let url = format!(
                "{}/{}?limit={}&offset={}",
                self.base_url, path, page_size, offset
            );
            debug!(%url, "fetching upstream page");
            let page = self.get_with_retry(&url).await?;

            let batch = page
                .get(collection_key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if reported_count.is_none() {
                reported_count = page.get("count").and_then(Value::as_u64);
            }

            let batch_len = batch.len();
            records.extend(batch);

            if batch_len < page_size {
                break;
            }
            if let Some(total) = reported_count {
                if records.len() as u64 >= total {
                    break;
                }
            }

            offset += page_size;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(PagedCollection {
            records,
            reported_count,
        })
    }

    /// Fetch the full properties collection.
    pub async fn fetch_properties(&self, page_size: usize) -> Result<Vec<Listing>, FetchError> {
        let paged = self
            .fetch_all_pages(PROPERTIES_PATH, "properties", page_size)
            .await?;
        Ok(decode_records(paged.records, "property"))
    }

    /// Fetch the brokers collection (not paginated upstream).
    pub async fn fetch_brokers(&self) -> Result<Vec<Broker>, FetchError> {
        let url = format!("{}/{}", self.base_url, BROKERS_PATH);
        let body = self.get_with_retry(&url).await?;
        let records = body
            .get("brokers")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(decode_records(records, "broker"))
    }

    /// Fetch every page of the lease-spaces collection.
    ///
    /// Returns the reported total count alongside the records because the
    /// proxy's own response echoes it.
    pub async fn fetch_lease_spaces(
        &self,
        page_size: usize,
    ) -> Result<(Option<u64>, Vec<LeaseSpace>), FetchError> {
        let paged = self
            .fetch_all_pages(LEASE_SPACES_PATH, "lease_spaces", page_size)
            .await?;
        let count = paged.reported_count;
        Ok((count, decode_records(paged.records, "lease space")))
    }

    /// GET a JSON document, retrying transient failures with backoff.
    async fn get_with_retry(&self, url: &str) -> Result<Value, FetchError> {
        let mut backoff = Backoff::new(BASE_DELAY_MS, BACKOFF_FACTOR, JITTER_MS);
        let mut attempt = 0u32;
        loop {
            match self.get_json(url).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt + 1 < MAX_ATTEMPTS => {
                    let delay = backoff.next_delay();
                    warn!(
                        %url,
                        attempt = attempt + 1,
                        max_attempts = MAX_ATTEMPTS,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient upstream failure, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Single GET attempt.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Decode(err)
            }
        })
    }
}

fn classify_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err)
    }
}

/// Decode raw JSON records into a typed collection, skipping anything that is
/// not an object so one malformed record cannot poison a whole page.
fn decode_records<T: serde::de::DeserializeOwned>(records: Vec<Value>, kind: &str) -> Vec<T> {
    let mut decoded = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value(record) {
            Ok(value) => decoded.push(value),
            Err(err) => warn!(%kind, error = %err, "skipping undecodable upstream record"),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(FetchError::Status { status: 429 }.is_retryable());
        assert!(FetchError::Status { status: 500 }.is_retryable());
        assert!(FetchError::Status { status: 503 }.is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(!FetchError::Status { status: 404 }.is_retryable());
        assert!(!FetchError::Status { status: 401 }.is_retryable());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = UpstreamClient::new("https://api.example.com/v1/").unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }
}
