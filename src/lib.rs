//! # Listings Proxy
//!
//! Cache-backed proxy and aggregation engine for a third-party commercial
//! real-estate listings API. The server side maintains a durable snapshot of the
//! upstream properties collection (fetch/retry/persist, never degrading to
//! emptiness); the consumer side joins listings with brokers and lease spaces
//! into an enriched working set and applies filter/search/sort over it.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`config`]: Environment-driven configuration
//! - [`models`]: Upstream record types, field-fallback chains, snapshot payload
//! - [`upstream`]: Paginated, rate-limited, retrying upstream client
//! - [`store`]: Two-tier (memory + disk) snapshot store
//! - [`services`]: Refresh control, aggregation engine, query engine
//! - [`client`]: Consumer-side loader and application state controller
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod client;
pub mod config;
pub mod http;
pub mod models;
pub mod services;
pub mod store;
pub mod upstream;
