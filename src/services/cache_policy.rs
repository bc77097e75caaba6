//! Cache key layout and TTL policy shared by the record and index caches.

use rand::Rng;
use std::time::Duration;

use crate::domain::models::{CacheConfig, CacheEntity};

/// TTL made of a fixed base plus a uniformly random jitter.
///
/// Spreading expirations keeps keys written together from all expiring in
/// the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitteredTtl {
    pub base: Duration,
    pub max_jitter: Duration,
}

impl JitteredTtl {
    pub const fn new(base: Duration, max_jitter: Duration) -> Self {
        Self { base, max_jitter }
    }

    /// Draw a TTL in `base..=base + max_jitter`, at whole-second jitter steps.
    pub fn sample(&self) -> Duration {
        let max_secs = self.max_jitter.as_secs();
        if max_secs == 0 {
            return self.base;
        }
        self.base + Duration::from_secs(rand::rng().random_range(0..=max_secs))
    }
}

/// TTLs applied by the cache-aside layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Found records.
    pub record_ttl: JitteredTtl,
    /// Sentinel ("not found") records.
    pub negative_ttl: Duration,
    /// Id-index partitions.
    pub index_ttl: JitteredTtl,
    /// Cached per-status counts.
    pub count_ttl: Duration,
}

impl CachePolicy {
    pub const fn from_config(config: &CacheConfig) -> Self {
        let jitter = Duration::from_secs(config.jitter_secs);
        Self {
            record_ttl: JitteredTtl::new(Duration::from_secs(config.record_ttl_secs), jitter),
            negative_ttl: Duration::from_secs(config.negative_ttl_secs),
            index_ttl: JitteredTtl::new(Duration::from_secs(config.index_ttl_secs), jitter),
            count_ttl: Duration::from_secs(config.index_ttl_secs),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Builds cache keys, optionally under a deployment-wide namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// `<prefix>_<id>`
    pub fn record<E: CacheEntity>(&self, id: E::Id) -> String {
        format!("{}{}_{}", self.namespace, E::CACHE_PREFIX, id)
    }

    /// `<prefix>_ids_<status>`
    pub fn index<E: CacheEntity>(&self, status: i32) -> String {
        format!("{}{}_ids_{}", self.namespace, E::CACHE_PREFIX, status)
    }

    /// `<prefix>_cnt_<status>`
    pub fn count<E: CacheEntity>(&self, status: i32) -> String {
        format!("{}{}_cnt_{}", self.namespace, E::CACHE_PREFIX, status)
    }
}
