use std::net::SocketAddr;

use anyhow::Context;
use tessera_server::config::AppConfig;
use tessera_server::state::AppState;
use tessera_server::{build_router, database, ideas, seed};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::seed_default_block_types(&db).await?;
    seed::ensure_indexes(&db).await?;

    let storage = common::storage::build_storage(&config.storage)
        .await
        .context("Failed to initialise file storage")?;
    info!(backend = ?config.storage.backend, "File storage ready");

    let ideas = ideas::build_client(&config.ideas).context("Failed to build ideas client")?;
    if config.ideas.base_url.is_none() {
        info!("Ideas service not configured; idea generation is disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        storage: storage.files,
        local_files: storage.local,
        ideas,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!(
        "API docs at http://{}/swagger-ui and http://{}/scalar",
        addr, addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
