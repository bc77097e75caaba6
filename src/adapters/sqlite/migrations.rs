//! Schema migrations, embedded from `migrations/` at compile time.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations and return the resulting schema version.
pub async fn run_migrations(pool: &SqlitePool) -> Result<i64, MigrateError> {
    MIGRATOR.run(pool).await?;
    let version = schema_version(pool).await?;
    tracing::debug!(layer = "sqlite", version, "schema up to date");
    Ok(version)
}

/// Highest successfully applied migration, 0 on a fresh database.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64, MigrateError> {
    let (version,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .map_err(MigrateError::Execute)?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{open_pool, DatabaseLocation, PoolConfig};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = open_pool(&DatabaseLocation::InMemory, PoolConfig::default()).await.unwrap();

        assert_eq!(run_migrations(&pool).await.unwrap(), 1);
        assert_eq!(run_migrations(&pool).await.unwrap(), 1);

        let (tables,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tbl_greeter'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(tables, 1);
    }
}
