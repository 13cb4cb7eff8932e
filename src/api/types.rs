//! Shared types for the HTTP API layer.

use std::sync::Arc;

use base64::Engine;
use chrono::FixedOffset;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Authenticated user, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
}

/// Hash a bearer token for storage and lookup (SHA-256, URL-safe base64).
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the caller's local-calendar offset from the `tz_offset_minutes`
/// query parameter (minutes east of UTC; absent means UTC).
pub fn local_offset(tz_offset_minutes: Option<i32>) -> Result<FixedOffset, ApiError> {
    let minutes = tz_offset_minutes.unwrap_or(0);
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid tz_offset_minutes: {minutes}")))
}
