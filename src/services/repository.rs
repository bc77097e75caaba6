//! Cache-aside repository, written once over any [`CacheEntity`].

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CacheEntity, ListQuery, Page};
use crate::domain::ports::{CacheStore, PrimaryStore};
use crate::services::cache_policy::{CachePolicy, KeySpace};
use crate::services::fanout::FanoutHydrator;
use crate::services::index_cache::{cursor_page, IndexCache, IndexPage};
use crate::services::record_cache::RecordCache;

/// Public read/write API over a primary store and a cache store.
///
/// Cache failures are absorbed and the call falls back to the primary
/// store. Primary store failures propagate, wrapped with the operation
/// name.
pub struct CachedRepository<E: CacheEntity> {
    store: Arc<dyn PrimaryStore<E>>,
    records: RecordCache<E>,
    index: IndexCache<E>,
    fanout: FanoutHydrator,
    policy: CachePolicy,
}

impl<E: CacheEntity> Clone for CachedRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            records: self.records.clone(),
            index: self.index.clone(),
            fanout: self.fanout,
            policy: self.policy,
        }
    }
}

impl<E: CacheEntity> CachedRepository<E> {
    pub fn new(
        store: Arc<dyn PrimaryStore<E>>,
        cache: Arc<dyn CacheStore>,
        keys: KeySpace,
        policy: CachePolicy,
        fanout: FanoutHydrator,
    ) -> Self {
        Self {
            store,
            records: RecordCache::new(cache.clone(), keys.clone(), policy),
            index: IndexCache::new(cache, keys, policy),
            fanout,
            policy,
        }
    }

    pub const fn fanout(&self) -> &FanoutHydrator {
        &self.fanout
    }

    /// Persist a new record and cache it for the base TTL.
    #[instrument(skip(self, entity), fields(entity = E::CACHE_PREFIX))]
    pub async fn create(&self, entity: &E) -> DomainResult<E> {
        let created = self
            .store
            .create(entity)
            .await
            .map_err(|e| e.in_operation("repository.create"))?;

        self.records
            .set_with_ttl(created.id(), &created, self.policy.record_ttl.base)
            .await;
        info!(layer = "repository", id = %created.id(), "record created");
        Ok(created)
    }

    /// Record for `id`, or the sentinel when it does not exist.
    pub async fn get_by_id(&self, id: E::Id) -> DomainResult<E> {
        if let Some(cached) = self.records.get(id).await {
            return Ok(cached);
        }

        let found = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| e.in_operation("repository.get_by_id"))?;
        self.records.set(id, &found).await;
        Ok(found)
    }

    /// One page of a status partition, hydrated concurrently.
    ///
    /// Records that fail to load, or that vanished between index read and
    /// hydration, are left out of `items`.
    #[instrument(skip(self), fields(entity = E::CACHE_PREFIX))]
    pub async fn get_list(&self, query: ListQuery<E::Id>) -> DomainResult<Page<E>> {
        let IndexPage { ids, total } = match self.index.get(&query).await {
            Some(page) => page,
            None => {
                let all = self
                    .store
                    .find_ids_by_status(query.status)
                    .await
                    .map_err(|e| e.in_operation("repository.get_list"))?;
                self.index.set(query.status, &all).await;
                IndexPage {
                    ids: cursor_page(&all, query.last_id, query.page_size),
                    total: all.len() as u64,
                }
            }
        };

        let repo = self.clone();
        let items: Vec<E> = self
            .fanout
            .hydrate(&ids, move |id| {
                let repo = repo.clone();
                async move { repo.get_by_id(id).await }
            })
            .await
            .into_iter()
            .filter(|record: &E| !record.is_sentinel())
            .collect();

        debug!(
            layer = "repository",
            status = query.status,
            requested = ids.len(),
            returned = items.len(),
            total,
            "list page assembled"
        );
        Ok(Page::new(items, total, query.page_size, query.page))
    }

    /// Set the status of `id` and drop its cached record.
    ///
    /// The id-index is left as is; the record stays listed under its old
    /// status until that partition expires.
    pub async fn update_status(&self, id: E::Id, status: i32) -> DomainResult<u64> {
        let affected = self
            .store
            .update_status(id, status)
            .await
            .map_err(|e| e.in_operation("repository.update_status"))?;
        self.records.invalidate(id).await;
        Ok(affected)
    }

    /// Add `delta` to counter `column` of `id` and drop its cached record.
    pub async fn update_count(&self, id: E::Id, delta: i32, column: &str) -> DomainResult<u64> {
        let affected = self
            .store
            .update_counter(id, column, delta)
            .await
            .map_err(|e| e.in_operation("repository.update_count"))?;
        self.records.invalidate(id).await;
        Ok(affected)
    }

    /// Delete `id`, its cached record and its membership in every status
    /// partition.
    ///
    /// The cache is cleared even when no row matched. A store failure
    /// leaves the cache untouched.
    pub async fn delete_by_id(&self, id: E::Id) -> DomainResult<u64> {
        let result = self
            .store
            .delete_by_id(id)
            .await
            .map_err(|e| e.in_operation("repository.delete_by_id"));

        if let Err(err) = &result {
            if !err.is_zero_affected() {
                return result;
            }
        }

        self.records.invalidate(id).await;
        for status in E::STATUSES {
            self.index.remove(*status, id).await;
        }
        match &result {
            Ok(_) => info!(layer = "repository", id = %id, "record deleted"),
            Err(_) => debug!(layer = "repository", id = %id, "no row to delete, cache cleared"),
        }
        result
    }

    /// Number of records with `status`, cached for the base TTL.
    pub async fn count_by_status(&self, status: i32) -> DomainResult<i64> {
        if let Some(count) = self.index.cached_count(status).await {
            return Ok(count);
        }

        let count = self
            .store
            .count_by_status(status)
            .await
            .map_err(|e| e.in_operation("repository.count_by_status"))?;
        self.index.store_count(status, count).await;
        Ok(count)
    }

    /// Rebuild the partition for `status` from the primary store and return
    /// its size.
    pub async fn warm_index(&self, status: i32) -> DomainResult<usize> {
        let ids = self
            .store
            .find_ids_by_status(status)
            .await
            .map_err(|e| e.in_operation("repository.warm_index"))?;
        self.index.set(status, &ids).await;
        debug!(layer = "repository", status, size = ids.len(), "index warmed");
        Ok(ids.len())
    }
}
