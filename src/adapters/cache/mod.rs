//! Key-value cache adapters.
//!
//! `MemoryCacheStore` keeps everything in-process with moka; `RedisCacheStore`
//! talks to a shared Redis server. Both implement the `CacheStore` port.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
