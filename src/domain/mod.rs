//! Domain layer for the greeter store
//!
//! Records, the generic cache entity abstraction, ports and errors.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
