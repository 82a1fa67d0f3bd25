//! Discord OAuth2 client
//!
//! Builds the authorization redirect and trades a callback code for the
//! user's profile. Holds no per-user state.

use axum::async_trait;
use serde::Deserialize;
use url::Url;

use super::user::UserRecord;
use crate::config::DiscordOAuthConfig;
use crate::error::{AppError, AuthError};

/// Identity delegation seam
///
/// Route handlers only see this trait, so tests can swap Discord for a stub.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider URL the browser is redirected to
    fn authorization_url(&self) -> Url;

    /// Exchange an authorization code for the user's identity
    async fn complete_auth(&self, code: &str) -> Result<UserRecord, AuthError>;
}

/// Token response from Discord's token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Discord implementation of [`IdentityProvider`]
pub struct DiscordClient {
    client_id: String,
    client_secret: String,
    redirect_uri: Url,
    scopes: Vec<String>,
    authorize_url: Url,
    token_url: Url,
    profile_url: Url,
    http: reqwest::Client,
}

impl DiscordClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns `Config` if any configured endpoint is not a valid URL
    pub fn new(config: &DiscordOAuthConfig, http: reqwest::Client) -> Result<Self, AppError> {
        let parse = |name: &str, value: &str| {
            Url::parse(value)
                .map_err(|e| AppError::Config(format!("auth.discord.{name} is invalid: {e}")))
        };

        let api_base = config.api_base_url.trim_end_matches('/');

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: parse("callback_url", &config.callback_url)?,
            scopes: config.scopes.clone(),
            authorize_url: parse("authorize_url", &config.authorize_url)?,
            token_url: parse("token_url", &config.token_url)?,
            profile_url: parse("api_base_url", &format!("{api_base}/users/@me"))?,
            http,
        })
    }

    /// Exchange the authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let response = ensure_success(response, "token exchange").await?;
        Ok(response.json::<TokenResponse>().await?)
    }

    /// Fetch the current user's profile
    async fn fetch_profile(&self, access_token: &str) -> Result<UserRecord, AuthError> {
        let response = self
            .http
            .get(self.profile_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response, "profile request").await?;
        Ok(response.json::<UserRecord>().await?)
    }
}

#[async_trait]
impl IdentityProvider for DiscordClient {
    fn authorization_url(&self) -> Url {
        let scope = self.scopes.join(" ");

        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &scope);
        url
    }

    async fn complete_auth(&self, code: &str) -> Result<UserRecord, AuthError> {
        let token = self.exchange_code(code).await?;
        let user = self.fetch_profile(&token.access_token).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Discord identity fetched");
        Ok(user)
    }
}

/// Pass 2xx responses through; turn anything else into `AuthError::Rejected`
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, AuthError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let detail = response.text().await.unwrap_or_default();
    tracing::debug!(operation, status, %detail, "Discord rejected request");
    Err(AuthError::Rejected {
        operation,
        status,
        detail,
    })
}
