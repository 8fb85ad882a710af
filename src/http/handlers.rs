//! HTTP handlers for the JSON API.
//!
//! Each handler corresponds to an endpoint and delegates to the store,
//! upstream client, or refresh controller.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::dto::{
    BrokersResponse, HealthResponse, LeaseSpacesResponse, ListingsResponse, PageQuery,
    RefreshQuery, RefreshResponse,
};
use super::error::AppError;
use super::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying the refresh credential.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// GET /api/listings
///
/// Serves the current snapshot. Never touches upstream: staleness is
/// preferable to a slow or failing read here. Optional `limit`/`offset`
/// slice the properties array while `count` reports the full total.
pub async fn get_listings(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Json<ListingsResponse> {
    let snapshot = state.store.current();
    let total = snapshot.count;

    let properties = match (page.limit, page.offset) {
        (None, None) => snapshot.properties,
        (limit, offset) => {
            let offset = offset.unwrap_or(0).min(snapshot.properties.len());
            let end = match limit {
                Some(limit) => offset.saturating_add(limit).min(snapshot.properties.len()),
                None => snapshot.properties.len(),
            };
            snapshot.properties[offset..end].to_vec()
        }
    };

    Json(ListingsResponse {
        properties,
        last_updated: snapshot.last_updated,
        count: total,
    })
}

/// GET /api/brokers
///
/// Pass-through to upstream; brokers are small and not snapshotted.
pub async fn get_brokers(State(state): State<AppState>) -> HandlerResult<BrokersResponse> {
    let brokers = state
        .upstream
        .fetch_brokers()
        .await
        .map_err(|err| AppError::upstream("Failed to fetch brokers", err))?;

    Ok(Json(BrokersResponse { brokers }))
}

/// GET /api/lease_spaces
///
/// Pass-through to upstream with internal pagination so the client always
/// sees full coverage in one response.
pub async fn get_lease_spaces(
    State(state): State<AppState>,
) -> HandlerResult<LeaseSpacesResponse> {
    let (reported_count, lease_spaces) = state
        .upstream
        .fetch_lease_spaces(state.lease_space_page_limit)
        .await
        .map_err(|err| AppError::upstream("Failed to fetch lease spaces", err))?;

    Ok(Json(LeaseSpacesResponse {
        message: "OK".to_string(),
        count: reported_count.unwrap_or(lease_spaces.len() as u64),
        lease_spaces,
    }))
}

/// POST /api/refresh
///
/// Authenticated manual refresh. Synchronous: the response reports the count
/// the store serves once the cycle completes.
pub async fn post_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RefreshQuery>,
) -> HandlerResult<RefreshResponse> {
    let header_token = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let token = header_token.or(query.token);

    let outcome = state.refresh.trigger(token.as_deref()).await?;

    Ok(Json(RefreshResponse {
        ok: true,
        count: outcome.count,
    }))
}

/// GET /refresh
///
/// The manual trigger is POST-only; this is a hint for humans poking at it.
pub async fn get_refresh_hint() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Use POST /api/refresh")
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.current();
    Json(HealthResponse {
        ok: true,
        count: snapshot.count,
        last_updated: snapshot.last_updated,
    })
}
