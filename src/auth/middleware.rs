//! Session middleware and the auth guard
//!
//! Every request passes through [`load_session`], which resolves the
//! signed session cookie or starts a fresh anonymous session. Handlers
//! then read it through [`CurrentSession`] or demand an identity through
//! [`CurrentUser`].

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::session::{Session, SessionId, sign_session_id, verify_session_cookie};
use super::user::UserRecord;
use crate::AppState;
use crate::error::{AppError, SIGN_IN_PATH};

/// Session resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub session: Session,
}

/// Outcome of the auth guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow(UserRecord),
    Deny { redirect_to: &'static str },
}

/// Auth guard: allow iff the session carries a user record
///
/// Denials always point back at the sign-in page.
pub fn require_auth(session: &Session) -> AuthDecision {
    match &session.user {
        Some(user) => AuthDecision::Allow(user.clone()),
        None => AuthDecision::Deny {
            redirect_to: SIGN_IN_PATH,
        },
    }
}

/// Middleware attaching a session to every request
///
/// Requests without a valid signed cookie, or whose session has expired,
/// get a new anonymous session and a `Set-Cookie` on the way out.
///
/// # Usage
/// ```ignore
/// let app = Router::new()
///     .route("/profile", get(profile))
///     .layer(middleware::from_fn_with_state(state.clone(), load_session));
/// ```
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = &state.config.auth;

    let existing = match jar
        .get(&auth.cookie_name)
        .map(|cookie| verify_session_cookie(cookie.value(), &auth.session_secret))
    {
        Some(Ok(id)) => state
            .sessions
            .get(&id)
            .await
            .map(|session| CurrentSession { id, session }),
        Some(Err(_)) => {
            tracing::debug!("Ignoring session cookie with invalid signature");
            None
        }
        None => None,
    };

    let (current, fresh) = match existing {
        Some(current) => (current, false),
        None => {
            let (id, session) = state.sessions.create().await;
            (CurrentSession { id, session }, true)
        }
    };

    let cookie = if fresh {
        Some(session_cookie(&state, &current.id)?)
    } else {
        None
    };

    request.extensions_mut().insert(current);
    let response = next.run(request).await;

    match cookie {
        Some(cookie) => Ok((jar.add(cookie), response).into_response()),
        None => Ok(response),
    }
}

/// Build the signed session cookie
fn session_cookie(state: &AppState, id: &SessionId) -> Result<Cookie<'static>, AppError> {
    let auth = &state.config.auth;
    let value = sign_session_id(id, &auth.session_secret)?;

    Ok(Cookie::build((auth.cookie_name.clone(), value))
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(auth.session_max_age))
        .build())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentSession>().cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("session middleware is not installed"))
        })
    }
}

/// Extractor for the authenticated user
///
/// Rejects anonymous sessions with a redirect to the sign-in page.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user.display_name())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state).await?;

        match require_auth(&current.session) {
            AuthDecision::Allow(user) => Ok(CurrentUser(user)),
            AuthDecision::Deny { .. } => {
                tracing::debug!(session_id = %current.id, "Anonymous session denied");
                Err(AppError::Unauthenticated)
            }
        }
    }
}
