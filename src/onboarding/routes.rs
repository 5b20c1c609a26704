//! Onboarding routes

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::common::error::method_not_allowed;

/// Creates and returns the onboarding router
///
/// Every route here sits under the session middleware's protected prefix.
pub fn onboarding_routes() -> Router {
    Router::new()
        .route(
            "/v1/onboarding/intent",
            put(handlers::update_intent).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/preference",
            put(handlers::update_preference).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/who-are-you",
            put(handlers::update_who_are_you).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/connection-style",
            put(handlers::update_connection_style).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/lifestyle",
            put(handlers::update_lifestyle).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/interests",
            put(handlers::update_interests).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/location",
            put(handlers::update_location).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/complete",
            post(handlers::complete_onboarding).fallback(method_not_allowed),
        )
        .route(
            "/v1/onboarding/profile",
            get(handlers::get_profile).fallback(method_not_allowed),
        )
}
