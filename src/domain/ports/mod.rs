//! Port trait definitions (Hexagonal Architecture)
//!
//! - `PrimaryStore`: durable record storage
//! - `CacheStore`: key-value cache primitives (hashes, sorted sets, counters)
//!
//! Adapters under `crate::adapters` implement these so the cache-aside
//! services stay independent of SQLite and Redis.

pub mod cache_store;
pub mod errors;
pub mod primary_store;

pub use cache_store::{CacheStore, ScoredMember, SortedSetPage};
pub use errors::{CacheError, CacheResult};
pub use primary_store::PrimaryStore;
