//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output with env-filter overrides
//! - Optional daily-rotated JSON log file

pub mod logger;

pub use logger::{LogFormat, LoggerImpl};
