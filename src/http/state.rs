//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::refresh::RefreshController;
use crate::store::SnapshotStore;
use crate::upstream::UpstreamClient;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot store serving the listings collection
    pub store: SnapshotStore,
    /// Upstream client used by the pass-through broker/lease-space endpoints
    pub upstream: UpstreamClient,
    /// Refresh controller behind POST /api/refresh
    pub refresh: Arc<RefreshController>,
    /// Page size for the internal lease-spaces pagination
    pub lease_space_page_limit: usize,
}

impl AppState {
    pub fn new(
        store: SnapshotStore,
        upstream: UpstreamClient,
        refresh: Arc<RefreshController>,
        lease_space_page_limit: usize,
    ) -> Self {
        Self {
            store,
            upstream,
            refresh,
            lease_space_page_limit,
        }
    }
}
