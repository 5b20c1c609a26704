//! Onboarding handlers
//!
//! One endpoint per onboarding screen. Each validates its payload, then
//! writes only the fields that screen owns.

use axum::extract::{rejection::JsonRejection, Extension, Json};
use tracing::{error, info};

use super::models::{
    ConnectionStyleRequest, IntentRequest, InterestsRequest, LifestyleInput, LocationInput,
    PreferenceRequest, ProfileSnapshot, SuccessResponse, WhoAreYouInput,
};
use super::store::StoreError;
use super::validators::OnboardingValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState, Validator};

/// PUT /v1/onboarding/intent
pub async fn update_intent(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<IntentRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    state
        .onboarding_store
        .upsert_intent(&user.id, request.intent.trim())
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save intent"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/preference
pub async fn update_preference(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<PreferenceRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    let genders: Vec<String> = request
        .preferred_genders
        .iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();

    state
        .onboarding_store
        .upsert_preference(&user.id, &genders)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save preference"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/who-are-you
///
/// # Request Body
/// ```json
/// { "displayName": "Sam", "gender": "woman", "pronouns": "she/her", "birthdate": "1994-05-17" }
/// ```
pub async fn update_who_are_you(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<WhoAreYouInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    state
        .onboarding_store
        .upsert_who_are_you(&user.id, &request)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save profile"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/connection-style
pub async fn update_connection_style(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<ConnectionStyleRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    state
        .onboarding_store
        .upsert_connection_style(&user.id, request.connection_style.trim())
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save connection style"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/lifestyle
pub async fn update_lifestyle(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<LifestyleInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    state
        .onboarding_store
        .upsert_lifestyle(&user.id, &request)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save lifestyle"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/interests
/// Replaces the whole interest set
pub async fn update_interests(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<InterestsRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    let interests: Vec<String> = request
        .interests
        .iter()
        .map(|i| i.trim().to_string())
        .collect();

    state
        .onboarding_store
        .replace_interests(&user.id, &interests)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save interests"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// PUT /v1/onboarding/location
pub async fn update_location(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    payload: Result<Json<LocationInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;
    OnboardingValidator.validate(&request).into_result()?;

    state
        .onboarding_store
        .update_location(&user.id, &request)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to save location"))?;

    Ok(Json(SuccessResponse::ok()))
}

/// POST /v1/onboarding/complete
/// Stamps the completion marker; calling it again just moves the timestamp
pub async fn complete_onboarding(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .onboarding_store
        .mark_onboarding_complete(&user.id)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to complete onboarding"))?;

    info!(user_id = %user.id, "Onboarding completed");
    Ok(Json(SuccessResponse::ok()))
}

/// GET /v1/onboarding/profile
/// Everything the user has answered so far
pub async fn get_profile(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<Json<ProfileSnapshot>, ApiError> {
    let profile = state
        .onboarding_store
        .load_profile(&user.id)
        .await
        .map_err(|e| store_failure(e, &user.id, "failed to load profile"))?;

    profile
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))
}

// ---- Helper Functions ----

fn store_failure(e: StoreError, user_id: &str, message: &str) -> ApiError {
    error!(error = %e, user_id = %user_id, "Onboarding store operation failed");
    ApiError::InternalServer(message.to_string())
}
