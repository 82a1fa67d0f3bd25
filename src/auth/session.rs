//! Session management
//!
//! Sessions live server-side in memory, keyed by an opaque random id.
//! The client holds the id in a cookie signed with HMAC-SHA256 so that
//! forged or tampered ids are rejected before the store is consulted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tokio::sync::RwLock;

use super::user::UserRecord;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per session id (256 bits)
const SESSION_ID_BYTES: usize = 32;

/// Opaque session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-side session state
///
/// Anonymous until the OAuth callback stores a [`UserRecord`].
#[derive(Debug, Clone)]
pub struct Session {
    /// Identity stored by the auth callback, verbatim
    pub user: Option<UserRecord>,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn anonymous(max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            user: None,
            created_at: now,
            expires_at: now + max_age,
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// A session is authenticated iff it carries a user record
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// In-memory session store
///
/// Single-process only. Entries are dropped lazily on read once expired
/// and eagerly by [`SessionStore::purge_expired`].
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    max_age: Duration,
}

impl SessionStore {
    /// Create a store whose sessions live for `max_age_secs`
    pub fn new(max_age_secs: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_age: Duration::seconds(max_age_secs),
        }
    }

    /// Start a new anonymous session
    pub async fn create(&self) -> (SessionId, Session) {
        let id = SessionId::generate();
        let session = Session::anonymous(self.max_age);

        let active = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id.clone(), session.clone());
            sessions.len()
        };

        use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_CREATED_TOTAL};
        SESSIONS_CREATED_TOTAL.inc();
        SESSIONS_ACTIVE.set(active as i64);

        tracing::debug!(session_id = %id, "Session created");
        (id, session)
    }

    /// Look up a live session
    ///
    /// Expired sessions read as absent.
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|session| !session.is_expired())
            .cloned()
    }

    /// Attach an authenticated identity to an existing session
    ///
    /// # Errors
    /// Returns `Unauthenticated` if the session no longer exists
    pub async fn put(&self, id: &SessionId, user: UserRecord) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if !session.is_expired() => {
                tracing::debug!(session_id = %id, user_id = %user.id, "Session authenticated");
                session.user = Some(user);
                Ok(())
            }
            _ => Err(AppError::Unauthenticated),
        }
    }

    /// Drop all expired sessions
    ///
    /// # Returns
    /// Number of sessions removed
    pub async fn purge_expired(&self) -> usize {
        let (removed, active) = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, session| !session.is_expired());
            (before - sessions.len(), sessions.len())
        };

        crate::metrics::SESSIONS_ACTIVE.set(active as i64);
        removed
    }

    /// Number of stored sessions, expired or not
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Sign a session id for the cookie
///
/// Cookie format: `{id}.base64(hmac_sha256(id))`
///
/// # Errors
/// Returns error if the secret cannot key the MAC
pub fn sign_session_id(id: &SessionId, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(e.into()))?;
    mac.update(id.as_str().as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", id, signature_b64))
}

/// Verify a signed cookie value and recover the session id
///
/// # Errors
/// Returns `Unauthenticated` if the value is malformed or the signature
/// does not match
pub fn verify_session_cookie(value: &str, secret: &str) -> Result<SessionId, AppError> {
    let (id, signature_b64) = value.split_once('.').ok_or(AppError::Unauthenticated)?;
    if id.is_empty() {
        return Err(AppError::Unauthenticated);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(e.into()))?;
    mac.update(id.as_bytes());

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthenticated)?;

    mac.verify_slice(&signature)
        .map_err(|_| AppError::Unauthenticated)?;

    Ok(SessionId(id.to_string()))
}
