//! API middleware.
//!
//! A single layer: bearer-token authentication. It resolves the token
//! to an owner and injects `UserContext` for the handlers.

pub mod auth;
