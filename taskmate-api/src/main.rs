//! # TaskMate API Server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=memory:// JWT_SECRET=$(openssl rand -hex 32) cargo run -p taskmate-api
//! ```

use taskmate_api::{config::Config, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmate_api=debug,taskmate_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskMate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    server::serve(config).await
}
