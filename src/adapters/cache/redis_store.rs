//! Redis-backed `CacheStore` using a deadpool connection pool.
//!
//! Multi-command updates run as atomic `MULTI`/`EXEC` pipelines so a
//! reader never observes a hash or sorted set without its TTL.

use async_trait::async_trait;
use deadpool_redis::{Config as RedisPoolConfig, Connection, Pool, PoolConfig, Runtime};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::ports::{CacheError, CacheResult, CacheStore, ScoredMember, SortedSetPage};

/// Redis cache store.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Build a pool for `url`. Connections are opened lazily.
    pub fn connect(url: &str, pool_size: usize) -> CacheResult<Self> {
        let mut config = RedisPoolConfig::from_url(url);
        config.pool = Some(PoolConfig::new(pool_size));
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> CacheResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Stop handing out connections and drop idle ones.
    pub fn close(&self) {
        self.pool.close();
    }
}

/// Redis rejects a zero expiry, so sub-second TTLs round up to one second.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Inclusive `ZREVRANGE` bounds for a page of `count` members starting at
/// `offset`. `None` for an empty page, where `stop = start - 1` would mean
/// "to the end".
fn rev_range_bounds(offset: usize, count: usize) -> Option<(usize, usize)> {
    let last = count.checked_sub(1)?;
    Some((offset, offset.saturating_add(last)))
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn hash_get_all(&self, key: &str) -> CacheResult<Option<HashMap<String, String>>> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = redis::cmd("HGETALL").arg(key).query_async(&mut conn).await?;
        // HGETALL answers an empty map for a missing key.
        Ok(if fields.is_empty() { None } else { Some(fields) })
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, String)], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().cmd("DEL").arg(key).ignore();
        pipe.cmd("HSET").arg(key);
        for (name, value) in fields {
            pipe.arg(*name).arg(value);
        }
        pipe.ignore();
        pipe.cmd("EXPIRE").arg(key).arg(expiry_secs(ttl)).ignore();

        let (): () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn sorted_set_rev_range(
        &self,
        key: &str,
        offset: usize,
        count: usize,
    ) -> CacheResult<Option<SortedSetPage>> {
        let mut conn = self.connection().await?;

        let Some((start, stop)) = rev_range_bounds(offset, count) else {
            let (exists, cardinality): (bool, usize) = redis::pipe()
                .atomic()
                .cmd("EXISTS")
                .arg(key)
                .cmd("ZCARD")
                .arg(key)
                .query_async(&mut conn)
                .await?;
            return Ok(exists.then(|| SortedSetPage {
                members: Vec::new(),
                cardinality,
            }));
        };

        let (exists, cardinality, members): (bool, usize, Vec<String>) = redis::pipe()
            .atomic()
            .cmd("EXISTS")
            .arg(key)
            .cmd("ZCARD")
            .arg(key)
            .cmd("ZREVRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await?;

        Ok(exists.then_some(SortedSetPage { members, cardinality }))
    }

    async fn sorted_set_replace(
        &self,
        key: &str,
        members: &[ScoredMember],
        ttl: Duration,
    ) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().cmd("DEL").arg(key).ignore();
        if !members.is_empty() {
            pipe.cmd("ZADD").arg(key);
            for member in members {
                pipe.arg(member.score).arg(&member.member);
            }
            pipe.ignore();
            pipe.cmd("EXPIRE").arg(key).arg(expiry_secs(ttl)).ignore();
        }

        let (): () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn sorted_set_remove(&self, key: &str, member: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = redis::cmd("ZREM").arg(key).arg(member).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn get_number(&self, key: &str) -> CacheResult<Option<i64>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        value
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| CacheError::InvalidValue(format!("{key}: {raw}")))
            })
            .transpose()
    }

    async fn set_number(&self, key: &str, value: i64, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let (): () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_rounds_up() {
        assert_eq!(expiry_secs(Duration::from_millis(200)), 1);
        assert_eq!(expiry_secs(Duration::from_secs(300)), 300);
    }

    #[test]
    fn test_rev_range_bounds_are_inclusive() {
        assert_eq!(rev_range_bounds(0, 1), Some((0, 0)));
        assert_eq!(rev_range_bounds(0, 20), Some((0, 19)));
        assert_eq!(rev_range_bounds(40, 20), Some((40, 59)));
    }

    #[test]
    fn test_empty_page_has_no_range() {
        assert_eq!(rev_range_bounds(0, 0), None);
        assert_eq!(rev_range_bounds(15, 0), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Nothing listens on port 1; the pool is built but checkout fails.
        let store = RedisCacheStore::connect("redis://127.0.0.1:1", 1).unwrap();
        let result = store.hash_get_all("greeter_1").await;
        assert!(result.is_err());
    }
}
