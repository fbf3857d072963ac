use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use wtwr_api::config::{AppConfig, Environment};
use wtwr_api::routes;
use wtwr_api::state::AppState;
use wtwr_api::store::memory::MemoryStore;
use wtwr_api::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wtwr_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();
    if config.environment == Environment::Production && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set when APP_ENV=production");
    }
    tracing::info!(environment = ?config.environment, "starting WTWR API");

    let port = config.server.port;
    let state = if config.database.in_memory {
        tracing::warn!("using the in-memory store; data will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        AppState::new(config, store.clone(), store)
    } else {
        let store = Arc::new(
            PgStore::connect(&config.database)
                .await
                .context("failed to connect to database")?,
        );
        AppState::new(config, store.clone(), store)
    };

    let app = routes::app(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tracing::info!("listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
