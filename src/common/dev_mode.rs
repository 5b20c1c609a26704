// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Enables the debug identity header and echoes one-time codes back to clients

use std::env;
use tracing::{info, warn};

/// Header accepted as an alternate identity source while in development mode
pub const DEBUG_USER_HEADER: &str = "x-debug-userid";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
}

impl DevModeConfig {
    /// Reads `DEV_MODE`; anything other than `true` (including unset) is production
    pub fn from_env() -> Self {
        Self::from_env_value(env::var("DEV_MODE").ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let enabled = value
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self { enabled }
    }

    pub fn development() -> Self {
        Self { enabled: true }
    }

    pub fn production() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `request-otp` may return the plaintext code to the caller
    pub fn expose_debug_codes(&self) -> bool {
        self.enabled
    }

    /// Whether the `X-Debug-UserID` header may stand in for a bearer token
    pub fn accepts_debug_user_header(&self) -> bool {
        self.enabled
    }
}

/// Log dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        warn!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        warn!("   X-Debug-UserID header accepted as identity fallback");
        warn!("   One-time codes are returned in request-otp responses");
        warn!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
    } else {
        info!("🔒 Production mode - bearer tokens required for identity");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args() -> Option<bool> {
    parse_dev_mode_flag(env::args())
}

fn parse_dev_mode_flag<I: IntoIterator<Item = String>>(args: I) -> Option<bool> {
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args() {
        info!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
