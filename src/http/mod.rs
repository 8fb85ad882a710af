//! HTTP server module for the listings proxy.
//!
//! Axum-based surface over the snapshot store, upstream client, and refresh
//! controller. Handlers stay thin: request parsing, wire-format mapping, and
//! delegation to the service layer.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
