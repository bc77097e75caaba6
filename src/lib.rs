//! Greeter - cache-aside record store
//!
//! Serves greeter records from a durable SQLite store through a key-value
//! cache: single records with negative caching and jittered TTLs, paginated
//! listings from per-status id indexes, and bounded concurrent hydration of
//! each page.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): records, pagination types and port traits
//! - **Adapters** (`adapters`): SQLite primary store, moka and Redis cache stores
//! - **Service Layer** (`services`): cache-aside repository and request handling
//! - **Infrastructure Layer** (`infrastructure`): config, logging, client registry
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{CacheEntity, Config, EntityId, Greeter, ListQuery, Page};
pub use domain::{DomainError, DomainResult};
pub use services::{CachedRepository, FanoutHydrator, GreeterService};
