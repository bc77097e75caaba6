//! Generic cache-aside entity abstraction.
//!
//! The repository, caches and fan-out are written once against
//! [`CacheEntity`]; each concrete record type supplies its key prefix,
//! status partitions and hash-field mapping.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use crate::domain::errors::DomainResult;

/// Integer primary key usable as a sorted-set member and score.
///
/// `Default` (zero) doubles as "no cursor" in list queries and as the id
/// of the sentinel record.
pub trait EntityId:
    Copy + Eq + Ord + Hash + Debug + Display + FromStr + Default + Send + Sync + 'static
{
    /// Sorted-set score for this id; ids are scored by their own value.
    fn score(self) -> f64;
}

impl EntityId for i32 {
    fn score(self) -> f64 {
        f64::from(self)
    }
}

impl EntityId for i64 {
    #[allow(clippy::cast_precision_loss)]
    fn score(self) -> f64 {
        self as f64
    }
}

/// A record served through the cache-aside layer.
pub trait CacheEntity: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Primary key type.
    type Id: EntityId;

    /// Prefix for every cache key of this entity (`<prefix>_<id>`).
    const CACHE_PREFIX: &'static str;

    /// Closed enumeration of status values; one id-index partition each.
    const STATUSES: &'static [i32];

    /// Integer columns that may be incremented through `update_count`.
    const COUNTER_COLUMNS: &'static [&'static str];

    fn id(&self) -> Self::Id;

    fn status(&self) -> i32;

    /// The all-default value is the "not found" sentinel.
    fn is_sentinel(&self) -> bool {
        *self == Self::default()
    }

    /// Flat field map written to the record hash. Zero-valued optional
    /// fields are omitted; `id` is always present so a negative entry is
    /// still a non-empty hash.
    fn to_cache_fields(&self) -> Vec<(&'static str, String)>;

    /// Rebuild a record from a cached hash. Missing fields take their
    /// default value.
    fn from_cache_fields(fields: &HashMap<String, String>) -> DomainResult<Self>;
}
