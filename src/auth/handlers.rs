//! Authentication handlers

use axum::extract::{rejection::JsonRejection, Extension, Json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::models::{
    AppleSignInRequest, AuthResponse, AuthUser, GoogleSignInRequest, OtpRequestedResponse,
    PhoneOtpRequest, PhoneOtpVerifyRequest, RefreshRequest, TokenKind,
};
use super::oidc::{IdTokenVerifier, IdentityProvider};
use super::otp::OtpError;
use crate::common::{safe_phone_log, ApiError, AppState, SharedState};

/// POST /v1/auth/google
/// Authenticates a user via a Google ID token
///
/// # Request Body
/// ```json
/// { "idToken": "<google id token>" }
/// ```
///
/// # Response
/// ```json
/// {
///   "accessToken": "<jwt>",
///   "refreshToken": "<jwt>",
///   "user": { "id": "google:<sub>", "onboardingCompleted": false }
/// }
/// ```
pub async fn google_sign_in(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<GoogleSignInRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Received Google auth request");
    let Json(request) = payload?;

    if request.id_token.is_empty() {
        if !request.code.is_empty() {
            // Code exchange is not implemented; an unverified code proves nothing
            warn!(provider = "google", "Rejected authorization-code sign-in attempt");
        }
        return Err(ApiError::BadRequest("idToken is required".to_string()));
    }

    let verifier = configured(&state.google_verifier, IdentityProvider::Google)?;
    sign_in_with_id_token(&state, verifier.as_ref(), &request.id_token).await
}

/// POST /v1/auth/apple
/// Authenticates a user via an Apple ID token
///
/// # Request Body
/// ```json
/// { "idToken": "<apple id token>" }
/// ```
pub async fn apple_sign_in(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<AppleSignInRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Received Apple auth request");
    let verifier = configured(&state.apple_verifier, IdentityProvider::Apple)?;

    let Json(request) = payload?;
    if request.id_token.is_empty() {
        return Err(ApiError::BadRequest("idToken is required".to_string()));
    }

    sign_in_with_id_token(&state, verifier.as_ref(), &request.id_token).await
}

/// POST /v1/auth/phone/request-otp
/// Generates a 6-digit code for the phone number. Delivery is not wired up;
/// in development mode the code is logged and echoed back as `debugCode`.
pub async fn request_phone_otp(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<PhoneOtpRequest>, JsonRejection>,
) -> Result<Json<OtpRequestedResponse>, ApiError> {
    let Json(request) = payload?;

    let phone = request.phone.trim();
    if phone.is_empty() {
        return Err(ApiError::BadRequest("phone is required".to_string()));
    }

    let code = state.otp_store.request_code(phone).await;

    let debug_code = if state.dev_mode.expose_debug_codes() {
        info!(
            phone = %safe_phone_log(phone),
            code = %code,
            "Generated OTP (DEV ONLY, send via SMS in production)"
        );
        Some(code)
    } else {
        info!(phone = %safe_phone_log(phone), "Generated OTP");
        None
    };

    Ok(Json(OtpRequestedResponse {
        success: true,
        debug_code,
    }))
}

/// POST /v1/auth/phone/verify-otp
/// Checks the code and, on success, issues a session for `phone:<number>`
pub async fn verify_phone_otp(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<PhoneOtpVerifyRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;

    let phone = request.phone.trim();
    let code = request.code.trim();
    if phone.is_empty() || code.is_empty() {
        return Err(ApiError::BadRequest(
            "phone and code are required".to_string(),
        ));
    }

    if let Err(e) = state.otp_store.verify_code(phone, code).await {
        warn!(
            provider = "phone",
            phone = %safe_phone_log(phone),
            reason = %e,
            "OTP verification failed"
        );
        return Err(match e {
            OtpError::TooManyAttempts => ApiError::TooManyRequests("too many attempts".to_string()),
            OtpError::NotFound | OtpError::Expired | OtpError::Mismatch => {
                ApiError::Unauthorized("invalid or expired code".to_string())
            }
        });
    }

    issue_session(&state, format!("phone:{}", phone), "phone")
}

/// POST /v1/auth/refresh
/// Exchanges a refresh token for a fresh access/refresh pair
pub async fn refresh_session(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;

    if request.refresh_token.is_empty() {
        return Err(ApiError::BadRequest("refreshToken is required".to_string()));
    }

    let claims = state
        .tokens
        .validate(&request.refresh_token)
        .map_err(|_| {
            warn!(provider = "refresh", "Refresh token rejected");
            ApiError::Unauthorized("invalid refresh token".to_string())
        })?;

    if claims.typ != TokenKind::Refresh || claims.sub.is_empty() {
        warn!(provider = "refresh", token_kind = ?claims.typ, "Refresh attempted with wrong token class");
        return Err(ApiError::Unauthorized("invalid refresh token".to_string()));
    }

    issue_session(&state, claims.sub, "refresh")
}

// ---- Helper Functions ----

fn configured(
    verifier: &Option<Arc<dyn IdTokenVerifier>>,
    provider: IdentityProvider,
) -> Result<Arc<dyn IdTokenVerifier>, ApiError> {
    verifier.clone().ok_or_else(|| {
        error!(provider = provider.name(), "Sign-in attempted but provider is not configured");
        ApiError::NotConfigured(format!("{} auth not configured", provider.name()))
    })
}

async fn sign_in_with_id_token(
    state: &AppState,
    verifier: &dyn IdTokenVerifier,
    raw_id_token: &str,
) -> Result<Json<AuthResponse>, ApiError> {
    let provider = verifier.provider();

    let identity = verifier.verify(raw_id_token).await.map_err(|_| {
        ApiError::Unauthorized(format!("invalid {} ID token", provider_label(provider)))
    })?;

    debug!(
        provider = provider.name(),
        has_email = identity.email.is_some(),
        "ID token verified"
    );

    issue_session(state, provider.identity_for(&identity.subject), provider.name())
}

fn issue_session(
    state: &AppState,
    user_id: String,
    proof: &'static str,
) -> Result<Json<AuthResponse>, ApiError> {
    let pair = state
        .tokens
        .issue(&user_id)
        .map_err(|_| ApiError::InternalServer("failed to issue session".to_string()))?;

    info!(provider = proof, "User authentication successful");

    Ok(Json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: AuthUser {
            id: user_id,
            // Completion lives in the onboarding store; sign-in never consults it
            onboarding_completed: false,
        },
    }))
}

fn provider_label(provider: IdentityProvider) -> &'static str {
    match provider {
        IdentityProvider::Google => "Google",
        IdentityProvider::Apple => "Apple",
    }
}
