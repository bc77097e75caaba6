use serde::{Deserialize, Serialize};

/// Main configuration structure for the greeter store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// List hydration configuration
    #[serde(default)]
    pub fanout: FanoutConfig,

    /// Event relay configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".greeter/greeter.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Which key-value cache backs the record and index caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process moka cache
    #[default]
    Memory,
    /// Shared Redis server
    Redis,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Cache backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis connection URL (redis backend only)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Redis connection pool size (redis backend only)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Namespace prepended to every cache key
    #[serde(default)]
    pub namespace: String,

    /// Maximum number of entries (memory backend only)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    /// Base TTL for positive record entries, in seconds
    #[serde(default = "default_record_ttl_secs")]
    pub record_ttl_secs: u64,

    /// TTL for negative (not found) record entries, in seconds
    #[serde(default = "default_negative_ttl_secs")]
    pub negative_ttl_secs: u64,

    /// Base TTL for id-index partitions and counters, in seconds
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,

    /// Upper bound of the random jitter added to base TTLs, in seconds
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

const fn default_pool_size() -> usize {
    16
}

const fn default_max_capacity() -> u64 {
    100_000
}

const fn default_record_ttl_secs() -> u64 {
    300
}

const fn default_negative_ttl_secs() -> u64 {
    60
}

const fn default_index_ttl_secs() -> u64 {
    300
}

const fn default_jitter_secs() -> u64 {
    120
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: default_redis_url(),
            pool_size: default_pool_size(),
            namespace: String::new(),
            max_capacity: default_max_capacity(),
            record_ttl_secs: default_record_ttl_secs(),
            negative_ttl_secs: default_negative_ttl_secs(),
            index_ttl_secs: default_index_ttl_secs(),
            jitter_secs: default_jitter_secs(),
        }
    }
}

/// List hydration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FanoutConfig {
    /// Shared deadline for hydrating one page, in seconds
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Maximum number of ids loaded concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

const fn default_deadline_secs() -> u64 {
    10
}

const fn default_max_concurrency() -> usize {
    32
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Event relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RelayConfig {
    /// Bounded queue capacity
    #[serde(default = "default_relay_capacity")]
    pub capacity: usize,
}

const fn default_relay_capacity() -> usize {
    32
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: default_relay_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
