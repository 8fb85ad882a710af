//! Refresh orchestration: authenticated manual trigger, cooldown, and the
//! fetch/persist cycle behind it.

use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::models::Snapshot;
use crate::store::SnapshotStore;
use crate::upstream::{FetchError, UpstreamClient};

/// Minimum interval between accepted manual refresh triggers.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Why a manual refresh trigger was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Missing/mismatched credential, or no credential configured server-side
    #[error("unauthorized")]
    Unauthorized,

    /// Triggered again before the cooldown window elapsed
    #[error("refresh is cooling down ({remaining_ms}ms remaining)")]
    Cooldown { remaining_ms: u64 },
}

/// Result of a refresh cycle.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOutcome {
    /// Listings now served (new count on success, surviving count on fallback)
    pub count: usize,
    /// Whether a fresh snapshot was actually fetched and committed
    pub refreshed: bool,
}

/// Serializes refresh attempts and gates the manual trigger.
pub struct RefreshController {
    client: UpstreamClient,
    store: SnapshotStore,
    refresh_token: String,
    page_limit: usize,
    last_trigger: Mutex<Option<Instant>>,
}

impl RefreshController {
    pub fn new(
        client: UpstreamClient,
        store: SnapshotStore,
        refresh_token: impl Into<String>,
        page_limit: usize,
    ) -> Self {
        Self {
            client,
            store,
            refresh_token: refresh_token.into(),
            page_limit,
            last_trigger: Mutex::new(None),
        }
    }

    /// Authenticated manual trigger.
    ///
    /// Runs synchronously: the response carries the count the store serves
    /// after the cycle completes. An upstream failure is not an error here;
    /// the store falls back to last-good and the surviving count is reported.
    pub async fn trigger(&self, token: Option<&str>) -> Result<RefreshOutcome, RefreshError> {
        if self.refresh_token.is_empty() || token != Some(self.refresh_token.as_str()) {
            return Err(RefreshError::Unauthorized);
        }

        {
            let mut last = self.last_trigger.lock();
            if let Some(at) = *last {
                let elapsed = at.elapsed();
                if elapsed < MIN_REFRESH_INTERVAL {
                    let remaining = MIN_REFRESH_INTERVAL - elapsed;
                    return Err(RefreshError::Cooldown {
                        remaining_ms: remaining.as_millis() as u64,
                    });
                }
            }
            *last = Some(Instant::now());
        }

        Ok(self.refresh_with_fallback().await)
    }

    /// Refresh without the credential/cooldown gate (boot and preload paths).
    ///
    /// Propagates the upstream error so those callers can report it; the
    /// store still serves last-good data either way.
    pub async fn refresh_now(&self) -> Result<RefreshOutcome, FetchError> {
        let Some(_guard) = self.store.try_begin_refresh() else {
            info!("refresh already in progress, skipping");
            return Ok(RefreshOutcome {
                count: self.store.current().count,
                refreshed: false,
            });
        };

        info!("loading listings from upstream");
        let properties = self.client.fetch_properties(self.page_limit).await?;
        let snapshot = Snapshot::new(properties, Some(Utc::now()));
        let count = snapshot.count;
        self.store.commit(snapshot);
        info!(count, "listings snapshot refreshed");

        Ok(RefreshOutcome {
            count,
            refreshed: true,
        })
    }

    /// Refresh, falling back to the last-good snapshot on upstream failure.
    async fn refresh_with_fallback(&self) -> RefreshOutcome {
        match self.refresh_now().await {
            Ok(outcome) => outcome,
            Err(err) => {
                let count = self.store.current().count;
                error!(error = %err, count, "refresh failed, keeping last-good snapshot");
                RefreshOutcome {
                    count,
                    refreshed: false,
                }
            }
        }
    }

    /// Milliseconds until the next trigger would be accepted, if cooling down.
    pub fn cooldown_remaining_ms(&self) -> Option<u64> {
        let last = self.last_trigger.lock();
        let at = (*last)?;
        let elapsed = at.elapsed();
        if elapsed < MIN_REFRESH_INTERVAL {
            Some((MIN_REFRESH_INTERVAL - elapsed).as_millis() as u64)
        } else {
            None
        }
    }
}
