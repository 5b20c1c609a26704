//! Fixtures for signing ID tokens with a fixed RSA test key, and for driving
//! the full router in HTTP-level tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::oidc::{IdentityProvider, OidcVerifier, APPLE_ISSUER, GOOGLE_ISSUER};
use crate::auth::otp::InMemoryOtpStore;
use crate::auth::tokens::SessionTokenIssuer;
use crate::common::dev_mode::DevModeConfig;
use crate::common::{AppState, SharedState};
use crate::onboarding::InMemoryOnboardingStore;

pub const TEST_KID: &str = "kindl-test-key";
pub const TEST_SECRET: &[u8] = b"test_secret_key";
pub const TEST_CLIENT_ID: &str = "kindl-test-client.apps.googleusercontent.com";

const TEST_PRIVATE_KEY_PEM: &str = include_str!("testdata/oidc_test_key.pem");
const TEST_MODULUS: &str = "yHea-ZInPrL-QJCSQP4VAHXsA6pQRbl6q5PZFj3zwAdZvMlX_ndHG5qWMcUlyPlzgretSVrrV14oW4GnWnECZDs5bUo_F8R28gT3g_r0QFvnHy3EnuhasB6nPgqfE-ojPQ1VhliJnM9BmLGqIJT6cSga7WIE306sA-KhY5uLxZSPIpzfZ_9-79eFBCajKPelNcCqZpwvjk5WFS1nRQm73_GjP3AEVWI4EE28hHi_sdflKa6vSlxPCQozE0tIGfaHHLIYWsUVGDi3LarGJszBhd4NGLJS8oZs3UebwR_W7MrVzFmAj1dzBjAlqXme7FNQEtHh5j7m1vRiQe3DZ0pJkQ";
const TEST_EXPONENT: &str = "AQAB";

pub fn test_jwks() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "kid": TEST_KID,
            "n": TEST_MODULUS,
            "e": TEST_EXPONENT,
        }]
    }))
    .expect("test JWKS should parse")
}

/// Claims shaped like a real provider token, valid for the next hour
pub fn id_token_claims(issuer: &str, subject: &str, audience: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": issuer,
        "sub": subject,
        "aud": audience,
        "email": "user@example.com",
        "iat": now,
        "exp": now + 3600,
    })
}

pub fn sign_id_token(claims: &Value) -> String {
    sign_id_token_with_kid(claims, TEST_KID)
}

/// Signed with the test key but naming an arbitrary key id
pub fn sign_id_token_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY_PEM.as_bytes())
        .expect("test key should parse");
    encode(&header, claims, &key).expect("test token should sign")
}

// ---- HTTP harness ----

/// Verifier preloaded with the test key set; never touches the network
fn preloaded_verifier(provider: IdentityProvider) -> OidcVerifier {
    OidcVerifier::with_keys(
        Client::builder().no_proxy().build().expect("test client should build"),
        provider,
        provider.default_issuer(),
        TEST_CLIENT_ID.to_string(),
        "http://127.0.0.1:9/unreachable-jwks".to_string(),
        test_jwks(),
    )
}

/// Both providers configured, memory stores
pub fn test_state(dev_mode: DevModeConfig) -> AppState {
    AppState {
        tokens: SessionTokenIssuer::new(TEST_SECRET),
        otp_store: Arc::new(InMemoryOtpStore::new()),
        google_verifier: Some(Arc::new(preloaded_verifier(IdentityProvider::Google))),
        apple_verifier: Some(Arc::new(preloaded_verifier(IdentityProvider::Apple))),
        onboarding_store: Arc::new(InMemoryOnboardingStore::new()),
        dev_mode,
    }
}

pub fn test_app(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);
    crate::build_router(shared)
}

pub fn google_id_token(subject: &str) -> String {
    sign_id_token(&id_token_claims(GOOGLE_ISSUER, subject, TEST_CLIENT_ID))
}

pub fn apple_id_token(subject: &str) -> String {
    sign_id_token(&id_token_claims(APPLE_ISSUER, subject, TEST_CLIENT_ID))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build")
}

/// Runs one request through a clone of the router and decodes the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}
