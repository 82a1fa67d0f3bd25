//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
    /// Public domain (e.g., "arcade.example.com" or "localhost:3000")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the public base URL
    ///
    /// # Returns
    /// Full URL like "https://arcade.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Session and identity provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session cookie signing secret (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    /// Name of the session cookie
    pub cookie_name: String,
    /// How often expired sessions are purged, in seconds
    pub sweep_interval_seconds: u64,
    pub discord: DiscordOAuthConfig,
}

/// Discord OAuth2 application settings
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Fixed redirect URI registered with the Discord application
    pub callback_url: String,
    /// Requested scopes (must include "identify")
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub token_url: String,
    /// REST API root, e.g. "https://discord.com/api"
    pub api_base_url: String,
}

/// Static game asset
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Path to the HTML document served at /game
    pub asset_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (DISCORD_ARCADE__*)
    /// 5. DISCORD_CLIENT_ID / DISCORD_CLIENT_SECRET
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.domain", "localhost:3000")?
            .set_default("server.protocol", "http")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("auth.cookie_name", "arcade_session")?
            .set_default("auth.sweep_interval_seconds", 300)?
            .set_default("auth.discord.client_secret", "")?
            .set_default(
                "auth.discord.callback_url",
                "http://localhost:3000/auth/callback",
            )?
            .set_default("auth.discord.scopes", vec!["identify"])?
            .set_default(
                "auth.discord.authorize_url",
                "https://discord.com/oauth2/authorize",
            )?
            .set_default("auth.discord.token_url", "https://discord.com/api/oauth2/token")?
            .set_default("auth.discord.api_base_url", "https://discord.com/api")?
            .set_default("game.asset_path", "assets/index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DISCORD_ARCADE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.discord.scopes")
                    .try_parsing(true),
            )
            // Conventional names used by Discord bot/app tooling
            .set_override_option("auth.discord.client_id", std::env::var("DISCORD_CLIENT_ID").ok())?
            .set_override_option(
                "auth.discord.client_secret",
                std::env::var("DISCORD_CLIENT_SECRET").ok(),
            )?
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        let discord = &self.auth.discord;
        if discord.client_id.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.discord.client_id must not be empty".to_string(),
            ));
        }

        if let Err(error) = url::Url::parse(&discord.callback_url) {
            return Err(crate::error::AppError::Config(format!(
                "auth.discord.callback_url is not a valid URL: {error}"
            )));
        }

        if !discord.scopes.iter().any(|scope| scope == "identify") {
            return Err(crate::error::AppError::Config(
                "auth.discord.scopes must include \"identify\"".to_string(),
            ));
        }

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure session cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    // Url::host_str keeps the brackets around IPv6 literals
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
