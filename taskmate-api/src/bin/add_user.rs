//! Creates a user directly in the configured store
//!
//! ```bash
//! add-user "Ada Lovelace" ada@example.com 'correct horse' ADMIN
//! ```
//!
//! Reads `DATABASE_URL` (and `.env`) like the server does. The in-memory
//! store is refused, since the user would vanish when this process exits.

use std::env;

use clap::{Arg, Command};
use taskmate_api::{
    config::{DatabaseConfig, MEMORY_DATABASE_URL},
    server::open_store,
};
use taskmate_shared::{
    auth::password::hash_password,
    models::{normalize_email, CreateUser, PublicUser, Role},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmate_api=info,taskmate_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = Command::new("add-user")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Create a TaskMate user")
        .arg(Arg::new("name").required(true).help("Display name"))
        .arg(Arg::new("email").required(true).help("Login email"))
        .arg(Arg::new("password").required(true).help("Plaintext password"))
        .arg(
            Arg::new("role")
                .default_value("USER")
                .value_parser(["ADMIN", "USER"])
                .ignore_case(true)
                .help("Account role"),
        )
        .get_matches();

    let arg = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    let name = arg("name");
    let email = normalize_email(&arg("email"));
    let role: Role = arg("role").parse().map_err(anyhow::Error::msg)?;

    dotenvy::dotenv().ok();
    let database = persistent_database(
        env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
    )?;

    let store = open_store(&database).await?;
    let user = store
        .create_user(CreateUser {
            name,
            email,
            password_hash: hash_password(&arg("password"))?,
            role,
        })
        .await?;

    println!(
        "User created successfully: {}",
        serde_json::to_string_pretty(&PublicUser::from(user))?
    );
    Ok(())
}

/// Single-connection config for `url`, rejecting the in-memory store
fn persistent_database(url: String) -> anyhow::Result<DatabaseConfig> {
    let database = DatabaseConfig {
        url,
        max_connections: 1,
    };
    if database.is_memory() {
        anyhow::bail!(
            "DATABASE_URL is {}; add-user needs a persistent database",
            MEMORY_DATABASE_URL
        );
    }
    Ok(database)
}
