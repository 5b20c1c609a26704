//! Authentication data models

use serde::{Deserialize, Serialize};

/// Discriminates access tokens from refresh tokens inside the signed claims
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure shared by access and refresh tokens
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub typ: TokenKind,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Identity attached to a request once its bearer token checks out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity(pub String);

/// Google Sign-In payload
///
/// `code` is accepted only so that code-exchange attempts can be recognised
/// and refused; it never grants a session.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppleSignInRequest {
    #[serde(default)]
    pub id_token: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct PhoneOtpRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct PhoneOtpVerifyRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub onboarding_completed: bool,
}

/// Body returned by every successful sign-in flow
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_code: Option<String>,
}
