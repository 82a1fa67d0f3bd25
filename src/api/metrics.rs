//! `/metrics` scrape endpoint

use axum::{Router, http::header, response::IntoResponse, routing::get};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// Mounted outside the session layer so scrapes never mint sessions.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(scrape))
}

async fn scrape() -> Result<impl IntoResponse, AppError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&REGISTRY.gather())
        .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("encoding metrics")))?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], body))
}
