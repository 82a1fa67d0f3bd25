//! discord-arcade binary entry point

use discord_arcade::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load .env and configuration
/// 2. Initialize tracing/logging
/// 3. Initialize metrics and AppState
/// 4. Start background tasks (session sweeper)
/// 5. Build Axum router and start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let dotenv = dotenvy::dotenv();
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    init_tracing(&config.logging);

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
    tracing::info!(
        domain = %config.server.domain,
        protocol = %config.server.protocol,
        "Configuration loaded"
    );

    // 3. Initialize application state
    discord_arcade::metrics::init_metrics();
    let state = AppState::new(config.clone())?;

    // 4. Start background tasks
    spawn_session_sweeper(state.clone());

    // 5. Build router and serve
    let app = discord_arcade::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Public URL: {}", config.server.base_url());

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("discord_arcade={},tower_http=debug", logging.level).into()
    });

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Spawn background task purging expired sessions
fn spawn_session_sweeper(state: AppState) {
    let interval_secs = state.config.auth.sweep_interval_seconds.max(1);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        // The first tick fires immediately; nothing can have expired yet.
        interval.tick().await;

        loop {
            interval.tick().await;

            let removed = state.sessions.purge_expired().await;
            if removed > 0 {
                tracing::info!(removed, "Purged expired sessions");
            }
        }
    });

    tracing::info!(interval_secs, "Session sweeper spawned");
}
