//! Common test utilities for integration tests
//!
//! Provides an in-memory primary store with call counters and fault
//! injection, a cache store that always fails, and a second entity type
//! used to exercise the repository with a non-greeter record.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use greeter::adapters::cache::MemoryCacheStore;
use greeter::domain::models::{CacheEntity, Greeter};
use greeter::domain::ports::{
    CacheError, CacheResult, CacheStore, PrimaryStore, ScoredMember, SortedSetPage,
};
use greeter::services::{CachePolicy, CachedRepository, FanoutHydrator, KeySpace};
use greeter::{DomainError, DomainResult};

/// Record mutations the in-memory store needs beyond [`CacheEntity`].
pub trait Fixture: CacheEntity {
    fn assign_id(&mut self, id: i64);
    fn set_status(&mut self, status: i32);
    fn bump(&mut self, column: &str, delta: i32);
}

impl Fixture for Greeter {
    fn assign_id(&mut self, id: i64) {
        self.id = i32::try_from(id).expect("test id fits in i32");
    }

    fn set_status(&mut self, status: i32) {
        self.status = status;
    }

    fn bump(&mut self, column: &str, delta: i32) {
        if column == "view_num" {
            self.view_num += delta;
        }
    }
}

/// Minimal second entity with a wide id and three status partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub likes: i64,
    pub status: i32,
}

impl CacheEntity for Note {
    type Id = i64;

    const CACHE_PREFIX: &'static str = "note";
    const STATUSES: &'static [i32] = &[0, 1, 2];
    const COUNTER_COLUMNS: &'static [&'static str] = &["likes"];

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> i32 {
        self.status
    }

    fn to_cache_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("id", self.id.to_string())];
        if !self.title.is_empty() {
            fields.push(("title", self.title.clone()));
        }
        if self.likes != 0 {
            fields.push(("likes", self.likes.to_string()));
        }
        if self.status != 0 {
            fields.push(("status", self.status.to_string()));
        }
        fields
    }

    fn from_cache_fields(fields: &HashMap<String, String>) -> DomainResult<Self> {
        let number = |name: &str| -> DomainResult<i64> {
            fields.get(name).map_or(Ok(0), |raw| {
                raw.parse()
                    .map_err(|_| DomainError::SerializationError(format!("bad {name}: {raw}")))
            })
        };
        Ok(Self {
            id: number("id")?,
            title: fields.get("title").cloned().unwrap_or_default(),
            likes: number("likes")?,
            status: i32::try_from(number("status")?)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
        })
    }
}

impl Fixture for Note {
    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn set_status(&mut self, status: i32) {
        self.status = status;
    }

    fn bump(&mut self, column: &str, delta: i32) {
        if column == "likes" {
            self.likes += i64::from(delta);
        }
    }
}

/// Primary store kept in a map, counting reads and able to fail or delay
/// individual ids.
pub struct InMemoryPrimaryStore<E: Fixture> {
    rows: Mutex<BTreeMap<E::Id, E>>,
    next_id: AtomicI64,
    failing_ids: Mutex<HashSet<E::Id>>,
    delays: Mutex<HashMap<E::Id, Duration>>,
    pub find_by_id_calls: AtomicUsize,
    pub find_ids_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
}

impl<E: Fixture> Default for InMemoryPrimaryStore<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            failing_ids: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
            find_by_id_calls: AtomicUsize::new(0),
            find_ids_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }
}

impl<E: Fixture> InMemoryPrimaryStore<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store `record` under its own id, bypassing id assignment.
    pub fn insert(&self, record: E) {
        self.rows.lock().unwrap().insert(record.id(), record);
    }

    /// Make `find_by_id(id)` fail with a database error.
    pub fn fail_id(&self, id: E::Id) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn delay_id(&self, id: E::Id, delay: Duration) {
        self.delays.lock().unwrap().insert(id, delay);
    }

    pub fn row(&self, id: E::Id) -> Option<E> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn find_by_id_count(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn find_ids_count(&self) -> usize {
        self.find_ids_calls.load(Ordering::SeqCst)
    }

    fn zero_rows(operation: &'static str, id: E::Id) -> DomainError {
        DomainError::ZeroAffectedRows {
            operation,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl<E: Fixture> PrimaryStore<E> for InMemoryPrimaryStore<E> {
    async fn create(&self, entity: &E) -> DomainResult<E> {
        let mut created = entity.clone();
        created.assign_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.insert(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: E::Id) -> DomainResult<E> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(DomainError::DatabaseError(format!("row {id} unreadable")));
        }
        Ok(self.row(id).unwrap_or_default())
    }

    async fn find_ids_by_status(&self, status: i32) -> DomainResult<Vec<E::Id>> {
        self.find_ids_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .rev()
            .filter(|r| r.status() == status)
            .map(CacheEntity::id)
            .collect())
    }

    async fn count_by_status(&self, status: i32) -> DomainResult<i64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.status() == status).count() as i64)
    }

    async fn update_status(&self, id: E::Id, status: i32) -> DomainResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or_else(|| Self::zero_rows("memory.update_status", id))?;
        row.set_status(status);
        Ok(1)
    }

    async fn update_counter(&self, id: E::Id, column: &str, delta: i32) -> DomainResult<u64> {
        if !E::COUNTER_COLUMNS.contains(&column) {
            return Err(DomainError::ValidationFailed(format!("Unknown counter column: {column}")));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or_else(|| Self::zero_rows("memory.update_counter", id))?;
        row.bump(column, delta);
        Ok(1)
    }

    async fn delete_by_id(&self, id: E::Id) -> DomainResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        rows.remove(&id)
            .map(|_| 1)
            .ok_or_else(|| Self::zero_rows("memory.delete_by_id", id))
    }
}

/// Primary store whose every call fails like a dropped connection.
pub struct UnavailablePrimaryStore;

#[async_trait]
impl PrimaryStore<Greeter> for UnavailablePrimaryStore {
    async fn create(&self, _entity: &Greeter) -> DomainResult<Greeter> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn find_by_id(&self, _id: i32) -> DomainResult<Greeter> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn find_ids_by_status(&self, _status: i32) -> DomainResult<Vec<i32>> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn count_by_status(&self, _status: i32) -> DomainResult<i64> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn update_status(&self, _id: i32, _status: i32) -> DomainResult<u64> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn update_counter(&self, _id: i32, _column: &str, _delta: i32) -> DomainResult<u64> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
    async fn delete_by_id(&self, _id: i32) -> DomainResult<u64> {
        Err(DomainError::DatabaseError("connection refused".to_string()))
    }
}

/// Cache store whose every call fails like an unreachable server.
pub struct UnreachableCacheStore;

fn unreachable<T>() -> CacheResult<T> {
    Err(CacheError::Transport("connection refused".to_string()))
}

#[async_trait]
impl CacheStore for UnreachableCacheStore {
    async fn hash_get_all(&self, _key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        unreachable()
    }
    async fn hash_set(&self, _key: &str, _fields: &[(&str, String)], _ttl: Duration) -> CacheResult<()> {
        unreachable()
    }
    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        unreachable()
    }
    async fn sorted_set_rev_range(&self, _key: &str, _offset: usize, _count: usize) -> CacheResult<Option<SortedSetPage>> {
        unreachable()
    }
    async fn sorted_set_replace(&self, _key: &str, _members: &[ScoredMember], _ttl: Duration) -> CacheResult<()> {
        unreachable()
    }
    async fn sorted_set_remove(&self, _key: &str, _member: &str) -> CacheResult<bool> {
        unreachable()
    }
    async fn get_number(&self, _key: &str) -> CacheResult<Option<i64>> {
        unreachable()
    }
    async fn set_number(&self, _key: &str, _value: i64, _ttl: Duration) -> CacheResult<()> {
        unreachable()
    }
    async fn ping(&self) -> CacheResult<()> {
        unreachable()
    }
}

/// Repository with default TTLs and a two-second fan-out deadline.
pub fn repository<E: Fixture>(
    store: Arc<dyn PrimaryStore<E>>,
    cache: Arc<dyn CacheStore>,
) -> CachedRepository<E> {
    repository_with_fanout(store, cache, FanoutHydrator::new(Duration::from_secs(2), 8))
}

pub fn repository_with_fanout<E: Fixture>(
    store: Arc<dyn PrimaryStore<E>>,
    cache: Arc<dyn CacheStore>,
    fanout: FanoutHydrator,
) -> CachedRepository<E> {
    CachedRepository::new(store, cache, KeySpace::default(), CachePolicy::default(), fanout)
}

/// In-memory store, moka cache and a repository over both.
pub fn memory_repository<E: Fixture>() -> (
    Arc<InMemoryPrimaryStore<E>>,
    Arc<MemoryCacheStore>,
    CachedRepository<E>,
) {
    let store = InMemoryPrimaryStore::<E>::new();
    let cache = Arc::new(MemoryCacheStore::new());
    let repo = repository(
        store.clone() as Arc<dyn PrimaryStore<E>>,
        cache.clone() as Arc<dyn CacheStore>,
    );
    (store, cache, repo)
}

/// Members of a cached partition, highest first, or `None` when absent.
pub async fn partition(cache: &MemoryCacheStore, key: &str) -> Option<Vec<String>> {
    cache
        .sorted_set_rev_range(key, 0, 1000)
        .await
        .expect("memory cache read")
        .map(|page| page.members)
}

pub fn greeter(id: i32, status: i32) -> Greeter {
    Greeter {
        id,
        name: format!("greeter-{id}"),
        status,
        create_datetime: "2021-09-30 10:00:00".to_string(),
        update_datetime: "2021-09-30 10:00:00".to_string(),
        ..Default::default()
    }
}

pub fn ids(records: &[Greeter]) -> Vec<i32> {
    records.iter().map(|g| g.id).collect()
}
