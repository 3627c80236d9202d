//! Shared-secret guard for publishing routes.

use axum::http::HeaderMap;

use crate::server::error::ApiError;

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Require the configured admin secret in [`ADMIN_SECRET_HEADER`]
///
/// A missing or blank configured secret fails closed with
/// [`ApiError::AdminNotConfigured`].
pub fn require_admin(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiError::AdminNotConfigured);
    };

    match headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(given) if given == expected => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}
