//! discord-arcade - Discord sign-in in front of a browser snake game
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /auth/start, /auth/callback (Discord OAuth)              │
//! │  - /, /profile (HTML pages)                                 │
//! │  - /game (static asset)                                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Session Middleware                        │
//! │  - Signed cookie → in-memory session                        │
//! │  - Auth guard for protected pages                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Identity Provider                           │
//! │  - Discord token exchange + /users/@me                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for pages, the game and metrics
//! - `auth`: Discord OAuth, sessions and the auth guard
//! - `render`: HTML rendering
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod render;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Identity provider (Discord in production)
    pub identity: Arc<dyn auth::IdentityProvider>,

    /// Server-side sessions
    pub sessions: Arc<auth::SessionStore>,
}

impl AppState {
    /// Initialize application state against Discord
    ///
    /// # Errors
    /// Returns error if the HTTP client or Discord endpoints cannot be set up
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("discord-arcade/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        let discord = auth::DiscordClient::new(&config.auth.discord, http_client)?;
        tracing::info!(
            client_id = %config.auth.discord.client_id,
            callback_url = %config.auth.discord.callback_url,
            "Discord client initialized"
        );

        Ok(Self::with_identity_provider(config, Arc::new(discord)))
    }

    /// Initialize application state with a custom identity provider
    pub fn with_identity_provider(
        config: config::AppConfig,
        identity: Arc<dyn auth::IdentityProvider>,
    ) -> Self {
        let sessions = auth::SessionStore::new(config.auth.session_max_age);

        Self {
            config: Arc::new(config),
            identity,
            sessions: Arc::new(sessions),
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower_http::trace::TraceLayer;

    Router::new()
        .merge(api::pages_router())
        .merge(auth::auth_router())
        .merge(api::game_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        .route("/health", axum::routing::get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
