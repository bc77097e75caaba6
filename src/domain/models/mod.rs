//! Domain models.

pub mod config;
pub mod entity;
pub mod greeter;
pub mod page;

pub use config::{
    CacheBackend, CacheConfig, Config, DatabaseConfig, FanoutConfig, LoggingConfig, RelayConfig,
};
pub use entity::{CacheEntity, EntityId};
pub use greeter::{now_datetime, Greeter, DATETIME_FORMAT, STATUS_ACTIVE, STATUS_INACTIVE};
pub use page::{ListQuery, Page, DEFAULT_PAGE_SIZE};
