//! Bearer-token identity middleware for protected routes

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::models::{SessionIdentity, TokenKind};
use crate::common::{safe_token_log, ApiError, SharedState};

/// Path prefix whose requests get their identity resolved from a bearer token
pub const PROTECTED_PREFIX: &str = "/v1/onboarding/";

/// Resolves the caller's identity from `Authorization: Bearer <access token>`.
///
/// A missing or blank header passes through untouched so downstream extractors can
/// apply their own fallback. A header that is present but unusable is a 401.
pub async fn session_identity(
    Extension(state): Extension<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with(PROTECTED_PREFIX) {
        return next.run(request).await;
    }

    let header = match request.headers().get(AUTHORIZATION) {
        None => return next.run(request).await,
        // A blank header counts as no header
        Some(value) if value.as_bytes().iter().all(u8::is_ascii_whitespace) => {
            return next.run(request).await
        }
        Some(value) => value.to_str().ok().map(str::to_string),
    };

    let token = match header.as_deref().and_then(bearer_token) {
        Some(token) => token,
        None => {
            warn!(path = %request.uri().path(), "Malformed Authorization header");
            return unauthorized("invalid Authorization header");
        }
    };

    let claims = match state.tokens.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(
                path = %request.uri().path(),
                token = %safe_token_log(token),
                reason = %e,
                "Bearer token failed validation"
            );
            return unauthorized("invalid token");
        }
    };

    if claims.typ != TokenKind::Access {
        warn!(token_kind = ?claims.typ, "Non-access token presented as bearer credential");
        return unauthorized("invalid token type");
    }

    if claims.sub.is_empty() {
        warn!("Bearer token carries an empty subject");
        return unauthorized("invalid token");
    }

    debug!(user_id = %claims.sub, "Session identity resolved");
    request.extensions_mut().insert(SessionIdentity(claims.sub));

    next.run(request).await
}

/// Extracts `<token>` from `Bearer <token>`; the scheme is case-insensitive
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
