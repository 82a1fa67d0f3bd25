//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::async_trait;
use discord_arcade::auth::{DiscordClient, IdentityProvider, UserRecord};
use discord_arcade::error::AuthError;
use discord_arcade::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;
use url::Url;

/// Contents written to the temporary game asset
pub const GAME_HTML: &[u8] = b"<!DOCTYPE html>\n<html><body><canvas id=\"board\"></canvas>\n\xe2\x9c\x93 snake</body></html>\n";

/// Build a configuration suitable for tests
pub fn test_config(asset_path: &Path) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
        },
        auth: config::AuthConfig {
            session_secret: "test-secret-key-that-is-32-bytes!".to_string(),
            session_max_age: 3600,
            cookie_name: "arcade_session".to_string(),
            sweep_interval_seconds: 300,
            discord: config::DiscordOAuthConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                callback_url: "http://localhost/auth/callback".to_string(),
                scopes: vec!["identify".to_string()],
                authorize_url: "https://discord.com/oauth2/authorize".to_string(),
                token_url: "https://discord.com/api/oauth2/token".to_string(),
                api_base_url: "https://discord.com/api".to_string(),
            },
        },
        game: config::GameConfig {
            asset_path: asset_path.to_path_buf(),
        },
        logging: config::LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Identity provider answering from a fixed code → profile table
///
/// Authorization URLs come from a real `DiscordClient` so redirects look
/// exactly like production.
pub struct StubProvider {
    inner: DiscordClient,
    profiles: HashMap<String, UserRecord>,
}

impl StubProvider {
    pub fn new(config: &config::AppConfig) -> Self {
        let inner = DiscordClient::new(&config.auth.discord, reqwest::Client::new())
            .expect("test discord config is valid");
        Self {
            inner,
            profiles: HashMap::new(),
        }
    }

    pub fn with_profile(mut self, code: &str, user: UserRecord) -> Self {
        self.profiles.insert(code.to_string(), user);
        self
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_url(&self) -> Url {
        self.inner.authorization_url()
    }

    async fn complete_auth(&self, code: &str) -> Result<UserRecord, AuthError> {
        self.profiles
            .get(code)
            .cloned()
            .ok_or_else(|| AuthError::Rejected {
                operation: "token exchange",
                status: 400,
                detail: r#"{"error": "invalid_grant"}"#.to_string(),
            })
    }
}

/// The fixture user from the login scenario
pub fn ana() -> UserRecord {
    serde_json::from_value(serde_json::json!({
        "id": "42",
        "username": "ana",
        "global_name": null,
        "avatar": "a1b2c3",
        "locale": "en-US",
        "premium_type": 0
    }))
    .expect("fixture profile decodes")
}

/// The login fixture with only the fields Discord always sends
pub fn ana_minimal() -> UserRecord {
    serde_json::from_value(serde_json::json!({
        "id": "42",
        "username": "ana",
        "global_name": null
    }))
    .expect("minimal profile decodes")
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    /// Client that does not follow redirects
    pub client: reqwest::Client,
}

impl TestServer {
    /// Test server backed by the real Discord client (no network use
    /// unless a callback is hit)
    pub async fn new() -> Self {
        let temp_dir = write_game_asset();
        let config = test_config(&temp_dir.path().join("index.html"));
        let state = AppState::new(config).expect("app state initializes");
        Self::start(state, temp_dir).await
    }

    /// Test server whose callbacks are answered by a [`StubProvider`]
    pub async fn with_stub(configure: impl FnOnce(StubProvider) -> StubProvider) -> Self {
        let temp_dir = write_game_asset();
        let config = test_config(&temp_dir.path().join("index.html"));
        let provider = configure(StubProvider::new(&config));
        let state = AppState::with_identity_provider(config, Arc::new(provider));
        Self::start(state, temp_dir).await
    }

    /// Serve an already built state
    pub async fn start(state: AppState, temp_dir: TempDir) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = discord_arcade::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// GET `path`, optionally presenting a session cookie
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }
        request.send().await.expect("request succeeds")
    }
}

fn write_game_asset() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("index.html"), GAME_HTML).unwrap();
    temp_dir
}

/// Extract `name=value` of the session cookie from a response
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("arcade_session="))
        .and_then(|value| value.split(';').next())
        .map(ToString::to_string)
}

/// The `Location` header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}
