use thiserror::Error;

/// Key-value cache errors
///
/// Callers of the record and index caches never see these; they are logged
/// and the lookup degrades to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache transport error: {0}")]
    Transport(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Wrong value type at key {0}")]
    WrongType(String),

    #[error("Invalid cached value: {0}")]
    InvalidValue(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
