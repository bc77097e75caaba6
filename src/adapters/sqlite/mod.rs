//! SQLite primary store for greeters.

pub mod connection;
pub mod greeter_store;
pub mod migrations;

pub use connection::{open_pool, verify_connection, ConnectionError, DatabaseLocation, PoolConfig};
pub use greeter_store::SqliteGreeterStore;
pub use migrations::{run_migrations, schema_version, MIGRATOR};

use sqlx::migrate::MigrateError;
use sqlx::SqlitePool;

use crate::domain::models::DatabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Open the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let location = DatabaseLocation::parse(&config.path)?;
    let pool = open_pool(&location, PoolConfig::from(config)).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Migrated in-memory database for tests.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = open_pool(&DatabaseLocation::InMemory, PoolConfig::default()).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
