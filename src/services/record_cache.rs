//! Single-record cache with positive and negative entries.
//!
//! Lookups never fail: a transport or decode error is logged and reported
//! as a miss so the caller falls back to the primary store.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::models::CacheEntity;
use crate::domain::ports::CacheStore;
use crate::services::cache_policy::{CachePolicy, KeySpace};

pub struct RecordCache<E> {
    store: Arc<dyn CacheStore>,
    keys: KeySpace,
    policy: CachePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for RecordCache<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
            policy: self.policy,
            _entity: PhantomData,
        }
    }
}

impl<E: CacheEntity> RecordCache<E> {
    pub const fn new(store: Arc<dyn CacheStore>, keys: KeySpace, policy: CachePolicy) -> Self {
        Self {
            store,
            keys,
            policy,
            _entity: PhantomData,
        }
    }

    /// Cached record for `id`. `Some(sentinel)` is a negative hit; `None`
    /// is a miss.
    pub async fn get(&self, id: E::Id) -> Option<E> {
        let key = self.keys.record::<E>(id);
        match self.store.hash_get_all(&key).await {
            Ok(Some(fields)) => match E::from_cache_fields(&fields) {
                Ok(record) => {
                    debug!(layer = "record_cache", key = %key, negative = record.is_sentinel(), "cache hit");
                    Some(record)
                }
                Err(err) => {
                    warn!(layer = "record_cache", key = %key, error = %err, "undecodable cache entry, treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(layer = "record_cache", key = %key, "cache miss");
                None
            }
            Err(err) => {
                warn!(layer = "record_cache", key = %key, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cache the store's answer for `id`: a found record for the jittered
    /// base TTL, the sentinel for the short negative TTL.
    pub async fn set(&self, id: E::Id, record: &E) {
        let ttl = if record.is_sentinel() {
            self.policy.negative_ttl
        } else {
            self.policy.record_ttl.sample()
        };
        self.set_with_ttl(id, record, ttl).await;
    }

    /// Best-effort write; failures are logged.
    pub async fn set_with_ttl(&self, id: E::Id, record: &E, ttl: Duration) {
        let key = self.keys.record::<E>(id);
        if let Err(err) = self.store.hash_set(&key, &record.to_cache_fields(), ttl).await {
            warn!(layer = "record_cache", key = %key, error = %err, "cache write failed");
        }
    }

    /// Drop the entry for `id` so the next read repopulates it.
    pub async fn invalidate(&self, id: E::Id) {
        let key = self.keys.record::<E>(id);
        match self.store.delete(&key).await {
            Ok(existed) => debug!(layer = "record_cache", key = %key, existed, "cache entry invalidated"),
            Err(err) => warn!(layer = "record_cache", key = %key, error = %err, "cache delete failed"),
        }
    }
}
