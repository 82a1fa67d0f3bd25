//! Static game page
//!
//! Serves the configured HTML asset byte-for-byte, independent of the
//! session state.

use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::AppState;
use crate::error::AppError;

/// Create game router
///
/// Routes:
/// - GET /game
pub fn game_router() -> Router<AppState> {
    Router::new().route("/game", get(game))
}

/// GET /game
///
/// Reads the asset on every request so a redeployed file is picked up
/// without a restart.
async fn game(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = &state.config.game.asset_path;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Game asset is missing");
            return Err(AppError::AssetNotFound);
        }
        Err(error) => {
            return Err(AppError::Internal(anyhow::Error::new(error).context(format!(
                "failed to read game asset {}",
                path.display()
            ))));
        }
    };

    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        bytes,
    )
        .into_response())
}
