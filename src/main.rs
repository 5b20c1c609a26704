// src/main.rs
use axum::{extract::Extension, middleware, routing::get, Json, Router};
use dotenv::dotenv;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod onboarding;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::middleware::session_identity;
use auth::oidc::{IdTokenVerifier, IdentityProvider, OidcVerifier};
use auth::otp::InMemoryOtpStore;
use auth::tokens::SessionTokenIssuer;
use common::config::AppConfig;
use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevModeConfig};
use common::{AppState, SharedState};
use logging_middleware::log_requests;
use onboarding::{InMemoryOnboardingStore, OnboardingStore, SqliteOnboardingStore};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();

    // ========================================================================
    // DEV MODE CONFIGURATION
    // ========================================================================

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    if config.using_fallback_secret {
        if dev_mode.is_enabled() {
            warn!("⚠️  JWT_SECRET not set, using the built-in development secret");
        } else {
            error!("🚨 JWT_SECRET not set in production mode, sessions are signed with a public development secret");
        }
    }

    // ========================================================================
    // IDENTITY PROVIDERS
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let google_verifier =
        discover_provider(&http_client, IdentityProvider::Google, &config.google_client_id).await?;
    let apple_verifier =
        discover_provider(&http_client, IdentityProvider::Apple, &config.apple_client_id).await?;

    // ========================================================================
    // ONBOARDING STORE
    // ========================================================================

    let onboarding_store = open_onboarding_store(config.database_url.as_deref()).await;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        tokens: SessionTokenIssuer::new(config.jwt_secret.as_bytes()),
        otp_store: Arc::new(InMemoryOtpStore::new()),
        google_verifier,
        apple_verifier,
        onboarding_store,
        dev_mode,
    };

    let shared: SharedState = Arc::new(app_state);

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = build_router(shared)
        .layer({
            let origins: Vec<axum::http::HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static(common::dev_mode::DEBUG_USER_HEADER),
                ])
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Routes plus the layers every request needs: app state, request logging
/// and bearer-token identity resolution
pub(crate) fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // ONBOARDING ROUTES (bearer token required)
        // ====================================================================
        .merge(onboarding::onboarding_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(session_identity))
        .layer(middleware::from_fn(log_requests))
        .layer(Extension(state))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A configured provider that cannot be discovered aborts start-up
async fn discover_provider(
    http: &Client,
    provider: IdentityProvider,
    client_id: &Option<String>,
) -> anyhow::Result<Option<Arc<dyn IdTokenVerifier>>> {
    let Some(client_id) = client_id else {
        info!(provider = provider.name(), "Client id not set, sign-in disabled");
        return Ok(None);
    };

    let verifier = OidcVerifier::discover(
        http.clone(),
        provider,
        provider.default_issuer(),
        client_id.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("{} OIDC discovery failed: {}", provider.name(), e))?;

    Ok(Some(Arc::new(verifier)))
}

/// SQLite when `DATABASE_URL` is set and usable, memory otherwise
async fn open_onboarding_store(database_url: Option<&str>) -> Arc<dyn OnboardingStore> {
    let Some(database_url) = database_url else {
        info!("DATABASE_URL not set, onboarding data is kept in memory");
        return Arc::new(InMemoryOnboardingStore::new());
    };

    match open_sqlite(database_url).await {
        Ok(store) => {
            info!("Onboarding store backed by SQLite");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to open database, falling back to in-memory onboarding store");
            Arc::new(InMemoryOnboardingStore::new())
        }
    }
}

async fn open_sqlite(database_url: &str) -> anyhow::Result<SqliteOnboardingStore> {
    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    Ok(SqliteOnboardingStore::new(pool))
}
