//! Phone one-time codes
//!
//! Only the SHA-256 digest of each code is kept. Every phone has at most one
//! pending entry; requesting a new code replaces the previous one.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

pub const OTP_LIFETIME_MINUTES: i64 = 5;
pub const MAX_OTP_ATTEMPTS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("no pending code for this phone")]
    NotFound,

    #[error("code expired")]
    Expired,

    #[error("too many attempts")]
    TooManyAttempts,

    #[error("code mismatch")]
    Mismatch,
}

/// Pending phone verification challenges
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Create (or replace) the challenge for `phone` and return the plaintext code
    async fn request_code(&self, phone: &str) -> String;

    /// Check `code` against the pending challenge for `phone`
    async fn verify_code(&self, phone: &str, code: &str) -> Result<(), OtpError>;
}

#[derive(Debug, Clone)]
struct OtpEntry {
    hash: [u8; 32],
    expires_at: DateTime<Utc>,
    attempts: u32,
}

#[derive(Debug)]
pub struct InMemoryOtpStore {
    entries: Mutex<HashMap<String, OtpEntry>>,
    lifetime: Duration,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::with_lifetime(Duration::minutes(OTP_LIFETIME_MINUTES))
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            lifetime,
        }
    }
}

impl Default for InMemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn request_code(&self, phone: &str) -> String {
        let code = generate_code();
        let now = Utc::now();
        let entry = OtpEntry {
            hash: hash_code(&code),
            expires_at: now + self.lifetime,
            attempts: 0,
        };

        let mut entries = self.entries.lock().await;
        // Unverified codes die with their expiry, not only on the next verify
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(phone.to_string(), entry);

        code
    }

    async fn verify_code(&self, phone: &str, code: &str) -> Result<(), OtpError> {
        let mut entries = self.entries.lock().await;

        let entry = entries.get_mut(phone).ok_or(OtpError::NotFound)?;

        if Utc::now() > entry.expires_at {
            entries.remove(phone);
            return Err(OtpError::Expired);
        }

        if entry.attempts >= MAX_OTP_ATTEMPTS {
            entries.remove(phone);
            return Err(OtpError::TooManyAttempts);
        }

        if hash_code(code) != entry.hash {
            entry.attempts += 1;
            return Err(OtpError::Mismatch);
        }

        entries.remove(phone);
        Ok(())
    }
}

/// Uniform 6-digit decimal code from the OS CSPRNG
fn generate_code() -> String {
    let n: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", n)
}

fn hash_code(code: &str) -> [u8; 32] {
    Sha256::digest(code.as_bytes()).into()
}
