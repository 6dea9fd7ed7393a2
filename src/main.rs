use std::str::FromStr;

use anyhow::Context;
use skillswap::{
    auth, cache::Caches, config::Config, db::Database, realtime::MessageHub, store::Store, AppState,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillswap=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.migrate().await?;

    let store = Store::new(
        db.pool().clone(),
        Caches::new(config.data_ttl, config.library_ttl),
        MessageHub::default(),
    );
    if config.seed_library && store.library.seed_if_empty().await? {
        tracing::info!("seeded skill library");
    }

    let secrets = std::fs::read_to_string(&config.client_secret_path)
        .with_context(|| format!("reading {}", config.client_secret_path))?;
    let clients = auth::Clients::from_json(serde_json::Value::from_str(&secrets)?, &config.public_url)
        .map_err(|e| e.0)?;

    let app = skillswap::app(AppState { store, clients }, config.session_idle)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, public_url = %config.public_url, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
