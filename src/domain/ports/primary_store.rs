use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::CacheEntity;

/// Port for the durable relational store behind the caches
///
/// Reads return the entity's sentinel value when nothing matches. Writes
/// return the affected-row count; zero rows is reported as
/// `DomainError::ZeroAffectedRows`, not as a transport error.
#[async_trait]
pub trait PrimaryStore<E: CacheEntity>: Send + Sync {
    /// Insert a new record and return it with its assigned id
    async fn create(&self, entity: &E) -> DomainResult<E>;

    /// Get a record by id, or the sentinel when no row matches
    async fn find_by_id(&self, id: E::Id) -> DomainResult<E>;

    /// All ids with the given status, highest id first
    async fn find_ids_by_status(&self, status: i32) -> DomainResult<Vec<E::Id>>;

    /// Number of records with the given status
    async fn count_by_status(&self, status: i32) -> DomainResult<i64>;

    /// Set the status of one record
    async fn update_status(&self, id: E::Id, status: i32) -> DomainResult<u64>;

    /// Add `delta` to an integer counter column of one record
    async fn update_counter(&self, id: E::Id, column: &str, delta: i32) -> DomainResult<u64>;

    /// Delete one record
    async fn delete_by_id(&self, id: E::Id) -> DomainResult<u64>;
}
