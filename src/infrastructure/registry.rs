//! Process-wide clients, built once at startup and closed explicitly.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::cache::{MemoryCacheStore, RedisCacheStore};
use crate::adapters::sqlite::{initialize_database, SqliteGreeterStore};
use crate::domain::models::{CacheBackend, Config, Greeter};
use crate::domain::ports::CacheStore;
use crate::services::{CachePolicy, CachedRepository, FanoutHydrator, KeySpace};

/// Owns the database pool and the cache client.
///
/// Repositories handed out by the registry share these clients. Call
/// [`ClientRegistry::close`] before exit so pooled connections shut down
/// cleanly.
pub struct ClientRegistry {
    pool: SqlitePool,
    cache: Arc<dyn CacheStore>,
    redis: Option<RedisCacheStore>,
    keys: KeySpace,
    policy: CachePolicy,
    fanout: FanoutHydrator,
}

impl ClientRegistry {
    /// Open the database (running migrations) and the configured cache.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context(format!("Failed to open database {}", config.database.path))?;

        let (cache, redis): (Arc<dyn CacheStore>, Option<RedisCacheStore>) = match config.cache.backend {
            CacheBackend::Memory => {
                let memory = MemoryCacheStore::with_capacity(config.cache.max_capacity);
                (Arc::new(memory) as Arc<dyn CacheStore>, None)
            }
            CacheBackend::Redis => {
                let redis = RedisCacheStore::connect(&config.cache.redis_url, config.cache.pool_size)
                    .context("Failed to create Redis pool")?;
                // Startup continues without a reachable cache.
                if let Err(err) = redis.ping().await {
                    warn!(layer = "registry", url = %config.cache.redis_url, error = %err, "redis not reachable, reads will fall back to the database");
                }
                (Arc::new(redis.clone()) as Arc<dyn CacheStore>, Some(redis))
            }
        };

        info!(
            layer = "registry",
            database = %config.database.path,
            cache = ?config.cache.backend,
            "clients connected"
        );
        Ok(Self::assemble(pool, cache, redis, config))
    }

    /// Registry over already-open clients.
    pub fn from_parts(pool: SqlitePool, cache: Arc<dyn CacheStore>, config: &Config) -> Self {
        Self::assemble(pool, cache, None, config)
    }

    fn assemble(
        pool: SqlitePool,
        cache: Arc<dyn CacheStore>,
        redis: Option<RedisCacheStore>,
        config: &Config,
    ) -> Self {
        Self {
            pool,
            cache,
            redis,
            keys: KeySpace::new(config.cache.namespace.clone()),
            policy: CachePolicy::from_config(&config.cache),
            fanout: FanoutHydrator::from_config(&config.fanout),
        }
    }

    pub fn greeter_repository(&self) -> CachedRepository<Greeter> {
        CachedRepository::new(
            Arc::new(SqliteGreeterStore::new(self.pool.clone())),
            self.cache.clone(),
            self.keys.clone(),
            self.policy,
            self.fanout,
        )
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cache(&self) -> Arc<dyn CacheStore> {
        self.cache.clone()
    }

    /// Close every client. Repositories still holding clones fail their
    /// next store call afterwards.
    pub async fn close(self) {
        if let Some(redis) = &self.redis {
            redis.close();
        }
        self.pool.close().await;
        info!(layer = "registry", "clients closed");
    }
}
