//! Database layer: connection pool, migrations, models, and repositories.
//!
//! All persistence goes through the repositories in [`repositories`]; handlers
//! never write SQL. Repository methods take `&PgPool` (or an open transaction
//! for the `_in_tx` variants) and return `sqlx::Error` untranslated -- the API
//! layer decides how database failures surface to clients.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Alias so callers do not have to name sqlx types directly.
pub type DbPool = PgPool;

/// Create the shared connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Cheap liveness probe used at startup and by the health endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
