//! Authentication routes

use axum::{routing::post, Router};

use super::handlers;
use crate::common::error::method_not_allowed;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /v1/auth/google` - Google ID token sign-in
/// - `POST /v1/auth/apple` - Apple ID token sign-in
/// - `POST /v1/auth/phone/request-otp` - Start phone verification
/// - `POST /v1/auth/phone/verify-otp` - Finish phone verification
/// - `POST /v1/auth/refresh` - Exchange a refresh token for a new pair
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/v1/auth/google",
            post(handlers::google_sign_in).fallback(method_not_allowed),
        )
        .route(
            "/v1/auth/apple",
            post(handlers::apple_sign_in).fallback(method_not_allowed),
        )
        .route(
            "/v1/auth/phone/request-otp",
            post(handlers::request_phone_otp).fallback(method_not_allowed),
        )
        .route(
            "/v1/auth/phone/verify-otp",
            post(handlers::verify_phone_otp).fallback(method_not_allowed),
        )
        .route(
            "/v1/auth/refresh",
            post(handlers::refresh_session).fallback(method_not_allowed),
        )
}
