//! Federated ID token verification (Google, Apple)
//!
//! Each configured provider gets one `OidcVerifier`, built at startup from the
//! provider's discovery document. Signing keys are cached and re-fetched once
//! when a token names a key id the cache does not know.

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header,
    jwk::{Jwk, JwkSet},
    Algorithm, DecodingKey, Validation,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

/// Minimum gap between key-set refreshes triggered by unknown key ids
const KEY_REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Google,
    Apple,
}

impl IdentityProvider {
    pub fn name(&self) -> &'static str {
        match self {
            IdentityProvider::Google => "google",
            IdentityProvider::Apple => "apple",
        }
    }

    pub fn default_issuer(&self) -> &'static str {
        match self {
            IdentityProvider::Google => GOOGLE_ISSUER,
            IdentityProvider::Apple => APPLE_ISSUER,
        }
    }

    /// Namespaced identity for a verified subject, e.g. `google:1234`
    pub fn identity_for(&self, subject: &str) -> String {
        format!("{}:{}", self.name(), subject)
    }

    fn accepted_issuers(&self, issuer: &str) -> Vec<String> {
        let mut issuers = vec![issuer.to_string()];
        // Google still mints some tokens with the scheme-less issuer
        if *self == IdentityProvider::Google && issuer == GOOGLE_ISSUER {
            issuers.push("accounts.google.com".to_string());
        }
        issuers
    }
}

/// Claims pulled out of a verified ID token
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
}

/// Deliberately carries no detail; the reason is only logged
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid ID token")]
    InvalidToken,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("invalid discovery document: {0}")]
    InvalidDocument(String),
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    fn provider(&self) -> IdentityProvider;

    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedIdentity, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    issuer: String,
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug)]
pub struct OidcVerifier {
    provider: IdentityProvider,
    client_id: String,
    issuers: Vec<String>,
    jwks_uri: String,
    http: Client,
    keys: RwLock<KeyCache>,
}

#[derive(Debug)]
struct KeyCache {
    set: JwkSet,
    /// Last refresh attempt from `find_key`; `None` until the first miss
    refreshed_at: Option<Instant>,
}

impl OidcVerifier {
    /// Fetch `<issuer>/.well-known/openid-configuration` and the key set it points to
    pub async fn discover(
        http: Client,
        provider: IdentityProvider,
        issuer: &str,
        client_id: String,
    ) -> Result<Self, DiscoveryError> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );

        debug!(provider = provider.name(), url = %discovery_url, "Fetching OIDC discovery document");

        let document: DiscoveryDocument = http
            .get(&discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if document.issuer != issuer {
            return Err(DiscoveryError::InvalidDocument(format!(
                "issuer mismatch: expected {}, got {}",
                issuer, document.issuer
            )));
        }

        let keys = fetch_jwks(&http, &document.jwks_uri).await?;

        info!(
            provider = provider.name(),
            key_count = keys.keys.len(),
            "OIDC provider discovered"
        );

        Ok(Self::with_keys(
            http,
            provider,
            issuer,
            client_id,
            document.jwks_uri,
            keys,
        ))
    }

    pub fn with_keys(
        http: Client,
        provider: IdentityProvider,
        issuer: &str,
        client_id: String,
        jwks_uri: String,
        keys: JwkSet,
    ) -> Self {
        Self {
            provider,
            client_id,
            issuers: provider.accepted_issuers(issuer),
            jwks_uri,
            http,
            keys: RwLock::new(KeyCache {
                set: keys,
                refreshed_at: None,
            }),
        }
    }

    async fn find_key(&self, kid: &str) -> Option<Jwk> {
        if let Some(jwk) = self.keys.read().await.set.find(kid) {
            return Some(jwk.clone());
        }

        // Providers rotate keys; refresh at most once per cooldown. Holding the
        // write lock makes concurrent misses share a single fetch.
        let mut cache = self.keys.write().await;
        if let Some(jwk) = cache.set.find(kid) {
            return Some(jwk.clone());
        }

        if cache
            .refreshed_at
            .is_some_and(|at| at.elapsed() < KEY_REFRESH_COOLDOWN)
        {
            debug!(provider = self.provider.name(), "Key refresh skipped during cooldown");
            return None;
        }

        cache.refreshed_at = Some(Instant::now());
        match fetch_jwks(&self.http, &self.jwks_uri).await {
            Ok(fresh) => {
                let found = fresh.find(kid).cloned();
                cache.set = fresh;
                found
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Failed to refresh signing keys");
                None
            }
        }
    }

    fn reject(&self, reason: &str) -> VerifyError {
        warn!(provider = self.provider.name(), reason = reason, "ID token rejected");
        VerifyError::InvalidToken
    }
}

#[async_trait]
impl IdTokenVerifier for OidcVerifier {
    fn provider(&self) -> IdentityProvider {
        self.provider
    }

    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let header = decode_header(raw_id_token).map_err(|_| self.reject("malformed header"))?;

        if header.alg != Algorithm::RS256 {
            return Err(self.reject("unexpected signing algorithm"));
        }

        let kid = header.kid.ok_or_else(|| self.reject("missing key id"))?;
        let jwk = self
            .find_key(&kid)
            .await
            .ok_or_else(|| self.reject("unknown key id"))?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|_| self.reject("unusable signing key"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&self.issuers);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<IdTokenClaims>(raw_id_token, &key, &validation).map_err(|e| {
            debug!(provider = self.provider.name(), error = %e, "ID token validation error");
            self.reject("claims or signature invalid")
        })?;

        if data.claims.sub.is_empty() {
            return Err(self.reject("empty subject"));
        }

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            email: data.claims.email,
        })
    }
}

async fn fetch_jwks(http: &Client, jwks_uri: &str) -> Result<JwkSet, DiscoveryError> {
    let keys = http
        .get(jwks_uri)
        .send()
        .await?
        .error_for_status()?
        .json::<JwkSet>()
        .await?;
    Ok(keys)
}
