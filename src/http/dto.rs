//! Request/response types for the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Broker, LeaseSpace, Listing};

/// Response for `GET /api/listings`.
///
/// `count` is always the full snapshot size, even when `limit`/`offset`
/// slice the properties array; clients paginate until they have `count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub properties: Vec<Listing>,
    pub last_updated: Option<DateTime<Utc>>,
    pub count: usize,
}

/// Response for `GET /api/brokers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokersResponse {
    pub brokers: Vec<Broker>,
}

/// Response for `GET /api/lease_spaces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseSpacesResponse {
    pub message: String,
    pub count: u64,
    pub lease_spaces: Vec<LeaseSpace>,
}

/// Response for a successful `POST /api/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub ok: bool,
    pub count: usize,
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Pagination parameters on `GET /api/listings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Query-string fallback for the refresh credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub token: Option<String>,
}
