/// Store selection and the HTTP serve loop
///
/// Shared by the `taskmate-api` and `add-user` binaries.

use std::sync::Arc;

use taskmate_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, PoolConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    app::{build_router, AppState},
    config::{Config, DatabaseConfig},
};

/// Opens the configured store
///
/// `memory://` gives a fresh in-memory store; anything else is treated as a
/// PostgreSQL URL, connected and migrated.
pub async fn open_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.is_memory() {
        warn!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(PoolConfig {
        url: config.url.clone(),
        max_connections: config.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    Ok(Arc::new(PgStore::new(pool)))
}

/// Serves the API until Ctrl-C
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.database).await?;
    let address = config.bind_address();

    if !config.api.static_dir.is_dir() {
        warn!(
            static_dir = %config.api.static_dir.display(),
            "Client directory not found; only the API will be served"
        );
    }

    let app = build_router(AppState::new(store, config));

    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
