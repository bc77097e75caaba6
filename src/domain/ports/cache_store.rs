use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::ports::errors::CacheResult;

/// Sorted-set member with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// A slice of a sorted set, highest score first, plus the set's cardinality
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedSetPage {
    pub members: Vec<String>,
    pub cardinality: usize,
}

/// Port for the fast key-value cache
///
/// Mirrors the handful of hash, sorted-set and counter primitives the
/// cache-aside layer needs. Every method reports transport failures; the
/// policy layers above decide to swallow them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// All fields of a hash, or `None` when the key does not exist
    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>>;

    /// Replace the hash at `key` with `fields` and expire it after `ttl`
    async fn hash_set(&self, key: &str, fields: &[(&str, String)], ttl: Duration) -> CacheResult<()>;

    /// Delete a key of any type; returns whether it existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Members in descending score order starting at `offset`, at most
    /// `count` of them. `None` when the key does not exist, which is
    /// distinct from an existing set with no members in range.
    async fn sorted_set_rev_range(
        &self,
        key: &str,
        offset: usize,
        count: usize,
    ) -> CacheResult<Option<SortedSetPage>>;

    /// Replace the whole sorted set at `key` and expire it after `ttl`
    async fn sorted_set_replace(
        &self,
        key: &str,
        members: &[ScoredMember],
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Remove one member, keeping the remaining TTL; returns whether it was present
    async fn sorted_set_remove(&self, key: &str, member: &str) -> CacheResult<bool>;

    /// Integer value at `key`
    async fn get_number(&self, key: &str) -> CacheResult<Option<i64>>;

    /// Store an integer value expiring after `ttl`
    async fn set_number(&self, key: &str, value: i64, ttl: Duration) -> CacheResult<()>;

    /// Round-trip health check
    async fn ping(&self) -> CacheResult<()>;
}
