// Persistence context: pooled PostgreSQL connections plus embedded migrations

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Opens the connection pool.
///
/// The first connection is established eagerly, so an unreachable database
/// fails startup instead of the first request.
pub async fn connect(connection_string: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(connection_string)
        .await?;
    tracing::info!("Database connected successfully");

    Ok(pool)
}

/// Applies the identity schema migrations under `migrations/`
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
