use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::{CacheBackend, Config};

/// Project config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "greeter.yaml";

/// Optional local overrides, looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "greeter.local.yaml";

/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "GREETER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Redis URL cannot be empty when the redis backend is selected")]
    EmptyRedisUrl,

    #[error("Invalid cache pool_size: {0}. Must be at least 1")]
    InvalidPoolSize(usize),

    #[error("Invalid {0}: must be at least 1 second")]
    InvalidTtl(&'static str),

    #[error("Invalid fanout max_concurrency: {0}. Must be at least 1")]
    InvalidMaxConcurrency(usize),

    #[error("Invalid fanout deadline_secs: {0}. Must be at least 1")]
    InvalidDeadline(u64),

    #[error("Invalid relay capacity: {0}. Must be at least 1")]
    InvalidRelayCapacity(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. greeter.yaml (project config)
    /// 3. greeter.local.yaml (local overrides, optional)
    /// 4. Environment variables (GREETER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Same as [`ConfigLoader::load`], with `config_file` replacing
    /// greeter.yaml when given.
    pub fn load_with(config_file: Option<&Path>) -> Result<Config> {
        let primary = config_file.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        let config: Config = Self::figment(&primary, Path::new(LOCAL_CONFIG_FILE))
            .extract()
            .context(format!("Failed to load config from {}", primary.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(primary: &Path, local: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(primary))
            .merge(Yaml::file(local))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let cache = &config.cache;
        if cache.backend == CacheBackend::Redis && cache.redis_url.trim().is_empty() {
            return Err(ConfigError::EmptyRedisUrl);
        }

        if cache.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize(cache.pool_size));
        }

        if cache.record_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("record_ttl_secs"));
        }
        if cache.negative_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("negative_ttl_secs"));
        }
        if cache.index_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("index_ttl_secs"));
        }

        if config.fanout.max_concurrency == 0 {
            return Err(ConfigError::InvalidMaxConcurrency(config.fanout.max_concurrency));
        }

        if config.fanout.deadline_secs == 0 {
            return Err(ConfigError::InvalidDeadline(config.fanout.deadline_secs));
        }

        if config.relay.capacity == 0 {
            return Err(ConfigError::InvalidRelayCapacity(config.relay.capacity));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
