//! Router configuration for the HTTP API.
//!
//! This module sets up all routes and middleware (CORS, compression,
//! tracing, refresh audit logging) and creates the axum router ready for
//! serving.

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS is permissive: the proxy serves a public read-only table
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/listings", get(handlers::get_listings))
        .route("/api/brokers", get(handlers::get_brokers))
        .route("/api/lease_spaces", get(handlers::get_lease_spaces))
        .route("/api/refresh", post(handlers::post_refresh))
        .route("/refresh", get(handlers::get_refresh_hint))
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn(refresh_audit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Audit log for refresh attempts: who asked, from where.
async fn refresh_audit(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path == "/refresh" || path.starts_with("/api/refresh") {
        let ip = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .unwrap_or("")
            .trim()
            .to_string();
        let user_agent = request
            .headers()
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        info!(
            method = %request.method(),
            uri = %request.uri(),
            ip,
            user_agent,
            "refresh endpoint hit"
        );
    }
    next.run(request).await
}
