//! E2E tests for the real Discord client against a local fake Discord

mod common;

use std::collections::HashMap;

use axum::{
    Form, Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{TestServer, location, session_cookie, test_config};
use discord_arcade::AppState;
use discord_arcade::auth::{DiscordClient, IdentityProvider};
use discord_arcade::error::AuthError;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// POST /api/oauth2/token
async fn token(Form(params): Form<HashMap<String, String>>) -> Response {
    let authorized = params.get("grant_type").map(String::as_str) == Some("authorization_code")
        && params.get("client_id").map(String::as_str) == Some("test-client-id")
        && params.get("client_secret").map(String::as_str) == Some("test-client-secret")
        && params.get("redirect_uri").map(String::as_str)
            == Some("http://localhost/auth/callback");

    let access_token = match params.get("code").map(String::as_str) {
        Some("valid123") if authorized => "access-42",
        Some("stale-token") if authorized => "revoked",
        Some("garbled") if authorized => "garbled",
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid_grant" })),
            )
                .into_response();
        }
    };

    Json(serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 604800,
        "refresh_token": "refresh-me",
        "scope": "identify"
    }))
    .into_response()
}

/// GET /api/users/@me
async fn me(headers: HeaderMap) -> Response {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer access-42") => Json(serde_json::json!({
            "id": "42",
            "username": "ana",
            "global_name": null,
            "avatar": "a1b2c3",
            "discriminator": "0",
            "locale": "en-US",
            "premium_type": 0,
            "mfa_enabled": false,
            "flags": 0
        }))
        .into_response(),
        Some("Bearer garbled") => (StatusCode::OK, "not json").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "401: Unauthorized", "code": 0 })),
        )
            .into_response(),
    }
}

/// Start the fake Discord and return its base URL
async fn spawn_fake_discord() -> String {
    let app = Router::new()
        .route("/api/oauth2/token", post(token))
        .route("/api/users/@me", get(me));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn client_against_fake() -> (DiscordClient, TempDir, String) {
    let base = spawn_fake_discord().await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir.path().join("index.html"));
    config.auth.discord.token_url = format!("{base}/api/oauth2/token");
    config.auth.discord.api_base_url = format!("{base}/api");

    let client = DiscordClient::new(&config.auth.discord, reqwest::Client::new()).unwrap();
    (client, temp_dir, base)
}

#[tokio::test]
async fn test_complete_auth_with_valid_code() {
    let (client, _dir, _) = client_against_fake().await;

    let user = client.complete_auth("valid123").await.expect("login succeeds");

    assert_eq!(user.id, "42");
    assert_eq!(user.username, "ana");
    assert_eq!(user.global_name, None);
    assert_eq!(user.avatar.as_deref(), Some("a1b2c3"));
}

#[tokio::test]
async fn test_complete_auth_with_invalid_code() {
    let (client, _dir, _) = client_against_fake().await;

    let error = client.complete_auth("bad").await.unwrap_err();

    assert!(matches!(
        error,
        AuthError::Rejected { operation: "token exchange", status: 400, .. }
    ));
}

#[tokio::test]
async fn test_complete_auth_with_rejected_token() {
    let (client, _dir, _) = client_against_fake().await;

    let error = client.complete_auth("stale-token").await.unwrap_err();

    assert!(matches!(
        error,
        AuthError::Rejected { operation: "profile request", status: 401, .. }
    ));
}

#[tokio::test]
async fn test_complete_auth_with_malformed_profile() {
    let (client, _dir, _) = client_against_fake().await;

    let error = client.complete_auth("garbled").await.unwrap_err();

    assert!(matches!(error, AuthError::Http(_)));
}

#[tokio::test]
async fn test_complete_auth_when_provider_unreachable() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir.path().join("index.html"));
    // Nothing listens on port 9 (discard) in the test environment
    config.auth.discord.token_url = "http://127.0.0.1:9/api/oauth2/token".to_string();

    let client = DiscordClient::new(&config.auth.discord, reqwest::Client::new()).unwrap();
    let error = client.complete_auth("valid123").await.unwrap_err();

    assert!(matches!(error, AuthError::Http(_)));
}

#[tokio::test]
async fn test_full_login_through_fake_discord() {
    let base = spawn_fake_discord().await;
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("index.html"), common::GAME_HTML).unwrap();
    let mut config = test_config(&temp_dir.path().join("index.html"));
    config.auth.discord.token_url = format!("{base}/api/oauth2/token");
    config.auth.discord.api_base_url = format!("{base}/api");

    let state = AppState::new(config).unwrap();
    let server = TestServer::start(state, temp_dir).await;

    let response = server.get("/auth/callback?code=valid123", None).await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/profile");
    let cookie = session_cookie(&response).unwrap();

    let response = server.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Welcome, ana!"));
    assert!(body.contains("/avatars/42/"));
}

#[tokio::test]
async fn test_failed_login_through_fake_discord_keeps_session_anonymous() {
    let base = spawn_fake_discord().await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir.path().join("index.html"));
    config.auth.discord.token_url = format!("{base}/api/oauth2/token");
    config.auth.discord.api_base_url = format!("{base}/api");

    let state = AppState::new(config).unwrap();
    let server = TestServer::start(state, temp_dir).await;

    let response = server.get("/auth/callback?code=bad", None).await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response).unwrap();

    let response = server.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/");
}
