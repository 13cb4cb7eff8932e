//! HTTP API.
//!
//! Exposes the medication tracker as REST endpoints. Routes are nested
//! under `/api/` and protected by bearer token auth.
//!
//! The router is composable: `api_router()` returns a `Router` that
//! can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
