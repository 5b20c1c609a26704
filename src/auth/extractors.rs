//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{request::Parts, Extensions},
};
use tracing::{debug, warn};

use super::models::SessionIdentity;
use crate::common::{dev_mode::DEBUG_USER_HEADER, ApiError, SharedState};

/// Authenticated user extractor
///
/// Reads the identity attached by the session middleware. In development mode
/// a request without a bearer token may name its user in `X-Debug-UserID`.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
}

/// Identity resolved by the session middleware, if any
pub fn identity_from_extensions(extensions: &Extensions) -> Option<&str> {
    extensions
        .get::<SessionIdentity>()
        .map(|identity| identity.0.as_str())
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = identity_from_extensions(&parts.extensions) {
            return Ok(AuthedUser { id: id.to_string() });
        }

        let Extension(app_state): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        // DEV MODE: explicit debug identity instead of a bearer token
        if app_state.dev_mode.accepts_debug_user_header() {
            let debug_id = parts
                .headers
                .get(DEBUG_USER_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|id| !id.is_empty());

            if let Some(id) = debug_id {
                debug!(user_id = %id, "DEV MODE: identity taken from debug header");
                return Ok(AuthedUser { id: id.to_string() });
            }
        }

        warn!("Request to protected route without user context");
        Err(ApiError::Unauthorized("missing user context".to_string()))
    }
}
