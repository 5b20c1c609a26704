// src/common/config.rs
//! Environment-derived configuration

use std::env;

/// Used when `JWT_SECRET` is unset. Never acceptable outside local development.
pub const DEV_FALLBACK_SECRET: &str = "dev-secret-change-me";

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8081,http://localhost:19006";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub using_fallback_secret: bool,
    pub google_client_id: Option<String>,
    pub apple_client_id: Option<String>,
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset so `GOOGLE_CLIENT_ID=` disables the provider
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (jwt_secret, using_fallback_secret) = match non_empty("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_FALLBACK_SECRET.to_string(), true),
        };

        let port = non_empty("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = non_empty("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            port,
            jwt_secret,
            using_fallback_secret,
            google_client_id: non_empty("GOOGLE_CLIENT_ID"),
            apple_client_id: non_empty("APPLE_CLIENT_ID"),
            database_url: non_empty("DATABASE_URL"),
            cors_origins,
        }
    }
}
