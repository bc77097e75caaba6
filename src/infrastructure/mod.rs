//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Client registry owning the database pool and cache client

pub mod config;
pub mod logging;
pub mod registry;

pub use registry::ClientRegistry;
