//! Cache-aside services built on the domain ports.

pub mod cache_policy;
pub mod event_relay;
pub mod fanout;
pub mod greeter_service;
pub mod index_cache;
pub mod job_registry;
pub mod record_cache;
pub mod repository;

pub use cache_policy::{CachePolicy, JitteredTtl, KeySpace};
pub use event_relay::{EventRelay, EventSubscriber, GreeterEvent, LoggingSubscriber, RelayError, RelayPublisher};
pub use fanout::FanoutHydrator;
pub use greeter_service::{ErrorCode, GreeterService, ServiceError, ServiceResult};
pub use index_cache::{cursor_page, IndexCache, IndexPage};
pub use job_registry::{Job, JobRegistry, REPORT_COUNTS_JOB, WARM_INDEX_JOB};
pub use record_cache::RecordCache;
pub use repository::CachedRepository;
