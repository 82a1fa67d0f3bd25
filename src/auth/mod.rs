//! Discord OAuth authentication
//!
//! Handles:
//! - Discord OAuth flow
//! - Session management
//! - Session middleware and the auth guard

pub mod discord;
mod middleware;
mod oauth;
pub mod session;
pub mod user;

pub use discord::{DiscordClient, IdentityProvider};
pub use middleware::{
    AuthDecision, CurrentSession, CurrentUser, load_session, require_auth,
};
pub use oauth::{PROFILE_PATH, auth_router};
pub use session::{Session, SessionId, SessionStore, sign_session_id, verify_session_cookie};
pub use user::{PremiumTier, UserRecord};
