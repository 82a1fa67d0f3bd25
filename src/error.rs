//! Error types for discord-arcade
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Authentication failures never surface provider detail to the client;
//! they become a redirect back to the sign-in page.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Where every failed or denied authentication lands
pub const SIGN_IN_PATH: &str = "/";

/// Failure while delegating identity to Discord
#[derive(Debug, Error)]
pub enum AuthError {
    /// The user declined consent (or Discord reported another error)
    #[error("authorization denied by provider: {0}")]
    Denied(String),

    /// The callback query string could not be decoded
    #[error("malformed callback query: {0}")]
    MalformedCallback(String),

    /// The callback arrived without an authorization code
    #[error("callback is missing the authorization code")]
    MissingCode,

    /// Discord answered with a non-2xx status
    #[error("{operation} failed with status {status}")]
    Rejected {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// Network failure or an undecodable response body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Identity delegation failed (302 to sign-in)
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Protected route hit by an anonymous session (302 to sign-in)
    #[error("Authentication required")]
    Unauthenticated,

    /// Static game asset missing (404)
    #[error("Asset not found")]
    AssetNotFound,

    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// 302 Found to `location`
///
/// axum's `Redirect` only offers 303/307/308.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Authentication failures redirect to the sign-in page; everything
    /// else maps to a status code with a JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let error_type = match &self {
            AppError::Auth(_) => "auth",
            AppError::Unauthenticated => "unauthenticated",
            AppError::AssetNotFound => "asset_not_found",
            AppError::NotFound => "not_found",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        };

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let (status, error_message) = match &self {
            AppError::Auth(error) => {
                tracing::warn!(%error, "Authentication failed; redirecting to sign-in");
                return found(SIGN_IN_PATH);
            }
            AppError::Unauthenticated => return found(SIGN_IN_PATH),
            AppError::AssetNotFound | AppError::NotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
