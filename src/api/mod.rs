//! HTTP surface for the monitor.
//!
//! Exposes the alert feed, acknowledgment and roster intake as JSON
//! endpoints under `/api/`, plus a push channel at `/ws/alerts`.
//! `ward_api_router()` returns a `Router` that can be mounted on any axum
//! server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::ward_api_router;
pub use server::{start_api_server, ApiSession, WardApiServer};
pub use types::ApiContext;
