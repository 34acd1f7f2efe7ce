//! Domopush client registry, backed by SQLite via sqlx.
//!
//! The registry owns every [`Client`](models::client::Client) record. The
//! dispatch engine reads and requests mutations exclusively through the
//! [`Registry`] trait; nothing else touches the `clients` table.

pub mod models;
pub mod registry;
pub mod repositories;

pub use registry::{Registry, RegistryError, SqliteRegistry};

/// Database connection pool used across the application.
pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool for the given SQLite URL
/// (e.g. `sqlite:///var/lib/domopush/clients.db?mode=rwc`).
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply all pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
