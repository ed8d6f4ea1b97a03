/// Embedded schema migrations
///
/// SQL files live in `taskmate-shared/migrations/` and are compiled into the
/// binary, so the server can bring an empty database up to date on start.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies every migration not yet recorded in `_sqlx_migrations`
///
/// # Errors
///
/// Returns an error if a migration fails; the failing migration is rolled
/// back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}
