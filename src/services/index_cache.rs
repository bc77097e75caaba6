//! Per-status id index held as a sorted set, plus cached per-status counts.
//!
//! Members are ids scored by their own value, so a reverse range is
//! "highest id first".

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::models::{CacheEntity, EntityId, ListQuery};
use crate::domain::ports::{CacheStore, ScoredMember};
use crate::services::cache_policy::{CachePolicy, KeySpace};

/// Ids of one requested page together with the partition size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage<Id> {
    pub ids: Vec<Id>,
    pub total: u64,
}

pub struct IndexCache<E> {
    store: Arc<dyn CacheStore>,
    keys: KeySpace,
    policy: CachePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for IndexCache<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
            policy: self.policy,
            _entity: PhantomData,
        }
    }
}

impl<E: CacheEntity> IndexCache<E> {
    pub const fn new(store: Arc<dyn CacheStore>, keys: KeySpace, policy: CachePolicy) -> Self {
        Self {
            store,
            keys,
            policy,
            _entity: PhantomData,
        }
    }

    /// Offset page of the cached partition for `query.status`.
    ///
    /// On a hit the page is taken at `(page - 1) * page_size` by descending
    /// id and `query.last_id` is not consulted. `None` means the partition is
    /// absent or unreadable.
    pub async fn get(&self, query: &ListQuery<E::Id>) -> Option<IndexPage<E::Id>> {
        let key = self.keys.index::<E>(query.status);
        let page = match self
            .store
            .sorted_set_rev_range(&key, query.offset(), query.page_size as usize)
            .await
        {
            Ok(Some(page)) => page,
            Ok(None) => {
                debug!(layer = "index_cache", key = %key, "index miss");
                return None;
            }
            Err(err) => {
                warn!(layer = "index_cache", key = %key, error = %err, "index read failed, treating as miss");
                return None;
            }
        };

        let mut ids = Vec::with_capacity(page.members.len());
        for member in &page.members {
            match member.parse::<E::Id>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    warn!(layer = "index_cache", key = %key, member = %member, "non-numeric index member, treating as miss");
                    return None;
                }
            }
        }

        debug!(layer = "index_cache", key = %key, returned = ids.len(), total = page.cardinality, "index hit");
        Some(IndexPage {
            ids,
            total: page.cardinality as u64,
        })
    }

    /// Replace the partition for `status` with `ids`. An empty id list leaves
    /// the partition absent.
    pub async fn set(&self, status: i32, ids: &[E::Id]) {
        let key = self.keys.index::<E>(status);
        let members: Vec<ScoredMember> = ids
            .iter()
            .map(|id| ScoredMember::new(id.to_string(), id.score()))
            .collect();
        let ttl = self.policy.index_ttl.sample();
        match self.store.sorted_set_replace(&key, &members, ttl).await {
            Ok(()) => debug!(layer = "index_cache", key = %key, size = members.len(), ttl_secs = ttl.as_secs(), "index rebuilt"),
            Err(err) => warn!(layer = "index_cache", key = %key, error = %err, "index write failed"),
        }
    }

    /// Remove `id` from the partition for `status`, keeping its TTL.
    pub async fn remove(&self, status: i32, id: E::Id) {
        let key = self.keys.index::<E>(status);
        match self.store.sorted_set_remove(&key, &id.to_string()).await {
            Ok(removed) => debug!(layer = "index_cache", key = %key, id = %id, removed, "index member removed"),
            Err(err) => warn!(layer = "index_cache", key = %key, id = %id, error = %err, "index remove failed"),
        }
    }

    /// Cached number of records with `status`, if present.
    pub async fn cached_count(&self, status: i32) -> Option<i64> {
        let key = self.keys.count::<E>(status);
        match self.store.get_number(&key).await {
            Ok(count) => count,
            Err(err) => {
                warn!(layer = "index_cache", key = %key, error = %err, "count read failed, treating as miss");
                None
            }
        }
    }

    pub async fn store_count(&self, status: i32, count: i64) {
        let key = self.keys.count::<E>(status);
        if let Err(err) = self.store.set_number(&key, count, self.policy.count_ttl).await {
            warn!(layer = "index_cache", key = %key, error = %err, "count write failed");
        }
    }
}

/// Select the page served on an index rebuild.
///
/// `ids` is the full partition, highest first. With a cursor only ids
/// strictly below it qualify; without one the page starts at the top. The
/// page number is ignored here.
pub fn cursor_page<Id: EntityId>(ids: &[Id], last_id: Id, page_size: u32) -> Vec<Id> {
    let has_cursor = last_id != Id::default();
    ids.iter()
        .copied()
        .filter(|id| !has_cursor || *id < last_id)
        .take(page_size as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MemoryCacheStore;
    use crate::domain::models::Greeter;
    use proptest::prelude::*;
    use std::time::Duration;

    fn memory_index() -> (Arc<MemoryCacheStore>, IndexCache<Greeter>) {
        let store = Arc::new(MemoryCacheStore::new());
        let index = IndexCache::new(store.clone(), KeySpace::default(), CachePolicy::default());
        (store, index)
    }

    #[tokio::test]
    async fn test_get_pages_by_offset_and_ignores_cursor() {
        let (_store, index) = memory_index();
        index.set(1, &[5, 4, 3, 2, 1]).await;

        let second = index.get(&ListQuery::new(1, 2, 2).after(5)).await.unwrap();
        assert_eq!(second.ids, vec![3, 2]);
        assert_eq!(second.total, 5);

        let past_end = index.get(&ListQuery::new(1, 2, 4)).await.unwrap();
        assert!(past_end.ids.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[tokio::test]
    async fn test_missing_partition_is_miss() {
        let (_store, index) = memory_index();
        assert_eq!(index.get(&ListQuery::new(0, 20, 1)).await, None);

        index.set(0, &[]).await;
        assert_eq!(index.get(&ListQuery::new(0, 20, 1)).await, None);
    }

    #[tokio::test]
    async fn test_set_uses_jittered_ttl() {
        let (store, index) = memory_index();
        index.set(1, &[1]).await;

        let ttl = store.time_to_live("greeter_ids_1").await.unwrap();
        assert!(ttl > Duration::from_secs(290));
        assert!(ttl <= Duration::from_secs(420));
    }

    #[tokio::test]
    async fn test_remove_member() {
        let (_store, index) = memory_index();
        index.set(1, &[3, 2, 1]).await;

        index.remove(1, 2).await;
        index.remove(0, 2).await;

        let page = index.get(&ListQuery::new(1, 10, 1)).await.unwrap();
        assert_eq!(page.ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_garbage_member_is_miss() {
        let (store, index) = memory_index();
        store
            .sorted_set_replace("greeter_ids_1", &[ScoredMember::new("abc", 1.0)], Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(index.get(&ListQuery::new(1, 10, 1)).await, None);
    }

    #[tokio::test]
    async fn test_count_roundtrip() {
        let (_store, index) = memory_index();
        assert_eq!(index.cached_count(1).await, None);

        index.store_count(1, 12).await;
        assert_eq!(index.cached_count(1).await, Some(12));
    }

    #[test]
    fn test_cursor_page() {
        let ids = [9, 7, 5, 3, 1];
        assert_eq!(cursor_page(&ids, 0, 2), vec![9, 7]);
        assert_eq!(cursor_page(&ids, 7, 2), vec![5, 3]);
        assert_eq!(cursor_page(&ids, 6, 10), vec![5, 3, 1]);
        assert!(cursor_page(&ids, 1, 10).is_empty());
    }

    proptest! {
        #[test]
        fn prop_cursor_page_below_cursor_and_descending(
            mut ids in proptest::collection::btree_set(1i32..10_000, 0..200)
                .prop_map(|set| set.into_iter().collect::<Vec<_>>()),
            last_id in 0i32..10_000,
            page_size in 1u32..50,
        ) {
            ids.reverse();
            let page = cursor_page(&ids, last_id, page_size);

            prop_assert!(page.len() <= page_size as usize);
            prop_assert!(page.windows(2).all(|w| w[0] > w[1]));
            if last_id != 0 {
                prop_assert!(page.iter().all(|id| *id < last_id));
            }
            let eligible = ids.iter().filter(|id| last_id == 0 || **id < last_id).count();
            prop_assert_eq!(page.len(), eligible.min(page_size as usize));
        }
    }
}
