//! HTML page endpoints
//!
//! - / (sign-in)
//! - /profile (authenticated)

use axum::{Router, response::Html, routing::get};

use crate::AppState;
use crate::auth::{CurrentSession, CurrentUser};
use crate::render::{render_home, render_profile};

/// Create pages router
///
/// Routes:
/// - GET / - Sign-in page
/// - GET /profile - Profile of the signed-in user
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/profile", get(profile))
}

/// GET /
///
/// Every failed or denied login ends up here.
async fn home(current: CurrentSession) -> Html<String> {
    let name = current.session.user.as_ref().map(|user| user.display_name());
    Html(render_home(name))
}

/// GET /profile
///
/// Anonymous sessions are redirected to / by the `CurrentUser` extractor.
async fn profile(CurrentUser(user): CurrentUser) -> Html<String> {
    tracing::debug!(user_id = %user.id, "Rendering profile");
    Html(render_profile(&user))
}
