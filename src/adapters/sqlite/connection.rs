//! SQLite pool construction for the greeter database.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid database location: {0}")]
    InvalidLocation(String),
    #[error("Failed to create database directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open pool: {0}")]
    PoolCreationFailed(#[source] sqlx::Error),
    #[error("Database did not answer: {0}")]
    Unresponsive(#[source] sqlx::Error),
}

/// Where the greeter table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private database of a single connection, gone when the pool closes.
    InMemory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Accepts bare paths as well as `sqlite:` and `sqlite://` URLs.
    pub fn parse(raw: &str) -> Result<Self, ConnectionError> {
        let raw = raw.trim();
        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);

        if path.is_empty() || path.contains("://") {
            return Err(ConnectionError::InvalidLocation(raw.to_string()));
        }
        if path == ":memory:" {
            return Ok(Self::InMemory);
        }
        Ok(Self::File(PathBuf::from(path)))
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, ConnectionError> {
        let options = match self {
            Self::InMemory => SqliteConnectOptions::from_str(MEMORY_URL)
                .map_err(|_| ConnectionError::InvalidLocation(MEMORY_URL.to_string()))?,
            Self::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        };
        Ok(options.synchronous(SqliteSynchronous::Normal))
    }

    fn ensure_parent_dir(&self) -> Result<(), ConnectionError> {
        let Self::File(path) = self else { return Ok(()) };
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        std::fs::create_dir_all(parent).map_err(|source| ConnectionError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            ..Self::default()
        }
    }
}

/// Open a pool at `location`, creating the file and its directory if needed.
///
/// An in-memory database is pinned to one connection that never idles out,
/// so every query sees the same data.
pub async fn open_pool(location: &DatabaseLocation, config: PoolConfig) -> Result<SqlitePool, ConnectionError> {
    location.ensure_parent_dir()?;
    let options = location.connect_options()?.busy_timeout(config.busy_timeout);

    let pool_options = match location {
        DatabaseLocation::InMemory => SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>),
        DatabaseLocation::File(_) => SqlitePoolOptions::new().max_connections(config.max_connections.max(1)),
    };

    let pool = pool_options
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)?;

    tracing::debug!(layer = "sqlite", ?location, "pool opened");
    Ok(pool)
}

pub async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(ConnectionError::Unresponsive)?;
    Ok(())
}
