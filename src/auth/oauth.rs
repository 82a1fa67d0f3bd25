//! Discord OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Discord.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use super::middleware::CurrentSession;
use crate::AppState;
use crate::error::{AppError, AuthError, found};
use crate::metrics::AUTH_CALLBACKS_TOTAL;

/// Where a successful login lands
pub const PROFILE_PATH: &str = "/profile";

/// Create authentication router
///
/// Routes:
/// - GET /auth/start - Redirect to Discord
/// - GET /auth/callback - OAuth callback
/// - GET /auth/discord, /auth/discord/callback - aliases for the above
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/start", get(start_auth))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/discord", get(start_auth))
        .route("/auth/discord/callback", get(auth_callback))
}

// =============================================================================
// Start
// =============================================================================

/// GET /auth/start
///
/// Redirects the browser to Discord's consent screen.
async fn start_auth(State(state): State<AppState>) -> Response {
    let url = state.identity.authorization_url();
    tracing::debug!("Redirecting to Discord authorization");
    found(url.as_str())
}

// =============================================================================
// Callback
// =============================================================================

/// Query parameters from Discord callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code
    code: Option<String>,
    /// Set when the user declines consent
    error: Option<String>,
    error_description: Option<String>,
}

/// GET /auth/callback
///
/// # Steps
/// 1. Reject provider errors and missing codes
/// 2. Exchange code for the user's identity
/// 3. Store the identity in the current session
/// 4. Redirect to the profile page
///
/// Any failure, including an undecodable query string, redirects to the
/// sign-in page and leaves the session anonymous.
async fn auth_callback(
    State(state): State<AppState>,
    current: CurrentSession,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let result = match query {
        Ok(Query(query)) => complete_callback(&state, &current, query).await,
        Err(rejection) => Err(AuthError::MalformedCallback(rejection.body_text()).into()),
    };

    let outcome = if result.is_ok() { "success" } else { "failure" };
    AUTH_CALLBACKS_TOTAL.with_label_values(&[outcome]).inc();

    result?;
    tracing::info!(session_id = %current.id, "Discord login successful");
    Ok(found(PROFILE_PATH))
}

async fn complete_callback(
    state: &AppState,
    current: &CurrentSession,
    query: CallbackQuery,
) -> Result<(), AppError> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        return Err(AuthError::Denied(format!("{error}: {description}")).into());
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let user = state.identity.complete_auth(&code).await?;
    state.sessions.put(&current.id, user).await
}
