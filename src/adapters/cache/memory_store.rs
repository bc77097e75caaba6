//! In-process `CacheStore` built on a moka TTL cache.
//!
//! Each entry carries its own deadline, so hashes, sorted sets and counters
//! can live side by side with independent TTLs. Used for single-node
//! deployments and tests.

use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use moka::Expiry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::ports::{CacheError, CacheResult, CacheStore, ScoredMember, SortedSetPage};

/// Default maximum number of cached keys.
const DEFAULT_MAX_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone)]
enum CacheValue {
    Hash(HashMap<String, String>),
    /// Kept sorted by ascending score.
    SortedSet(Vec<ScoredMember>),
    Number(i64),
}

#[derive(Debug)]
struct CacheEntry {
    value: CacheValue,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: CacheValue, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            value,
            expires_at: Instant::now() + ttl,
        })
    }
}

/// Expires every entry at its recorded deadline, also across updates.
struct DeadlineExpiry;

impl Expiry<String, Arc<CacheEntry>> for DeadlineExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(updated_at))
    }
}

/// Moka-backed cache store.
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Cache<String, Arc<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(DeadlineExpiry)
            .build();
        Self { entries }
    }

    /// Remaining lifetime of a key, if present.
    pub async fn time_to_live(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .await
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        match self.entries.get(key).await {
            None => Ok(None),
            Some(entry) => match &entry.value {
                CacheValue::Hash(fields) => Ok(Some(fields.clone())),
                _ => Err(CacheError::WrongType(key.to_string())),
            },
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, String)], ttl: Duration) -> CacheResult<()> {
        let fields = fields
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        self.entries
            .insert(key.to_string(), CacheEntry::new(CacheValue::Hash(fields), ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn sorted_set_rev_range(
        &self,
        key: &str,
        offset: usize,
        count: usize,
    ) -> CacheResult<Option<SortedSetPage>> {
        let Some(entry) = self.entries.get(key).await else {
            return Ok(None);
        };
        let CacheValue::SortedSet(members) = &entry.value else {
            return Err(CacheError::WrongType(key.to_string()));
        };

        Ok(Some(SortedSetPage {
            members: members
                .iter()
                .rev()
                .skip(offset)
                .take(count)
                .map(|m| m.member.clone())
                .collect(),
            cardinality: members.len(),
        }))
    }

    async fn sorted_set_replace(
        &self,
        key: &str,
        members: &[ScoredMember],
        ttl: Duration,
    ) -> CacheResult<()> {
        if members.is_empty() {
            // A sorted set with no members does not exist.
            self.entries.remove(key).await;
            return Ok(());
        }

        let mut sorted = members.to_vec();
        sorted.sort_by(|a, b| a.score.total_cmp(&b.score));
        sorted.dedup_by(|a, b| a.member == b.member);

        self.entries
            .insert(key.to_string(), CacheEntry::new(CacheValue::SortedSet(sorted), ttl))
            .await;
        Ok(())
    }

    async fn sorted_set_remove(&self, key: &str, member: &str) -> CacheResult<bool> {
        let mut wrong_type = false;
        let result = self
            .entries
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current.map(|e| e.into_value()) {
                    None => Op::Nop,
                    Some(entry) => match &entry.value {
                        CacheValue::SortedSet(members) if members.iter().any(|m| m.member == member) => {
                            let remaining: Vec<ScoredMember> =
                                members.iter().filter(|m| m.member != member).cloned().collect();
                            if remaining.is_empty() {
                                Op::Remove
                            } else {
                                Op::Put(Arc::new(CacheEntry {
                                    value: CacheValue::SortedSet(remaining),
                                    expires_at: entry.expires_at,
                                }))
                            }
                        }
                        CacheValue::SortedSet(_) => Op::Nop,
                        _ => {
                            wrong_type = true;
                            Op::Nop
                        }
                    },
                };
                std::future::ready(op)
            })
            .await;

        if wrong_type {
            return Err(CacheError::WrongType(key.to_string()));
        }
        Ok(matches!(result, CompResult::ReplacedWith(_) | CompResult::Removed(_)))
    }

    async fn get_number(&self, key: &str) -> CacheResult<Option<i64>> {
        match self.entries.get(key).await {
            None => Ok(None),
            Some(entry) => match &entry.value {
                CacheValue::Number(value) => Ok(Some(*value)),
                _ => Err(CacheError::WrongType(key.to_string())),
            },
        }
    }

    async fn set_number(&self, key: &str, value: i64, ttl: Duration) -> CacheResult<()> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(CacheValue::Number(value), ttl))
            .await;
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}
