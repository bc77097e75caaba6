//! Domain errors for the greeter store.

use thiserror::Error;

/// Domain-level errors surfaced by the repository and its collaborators.
///
/// There is no "not found" variant: a missing record is the sentinel
/// value, never an error.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{operation} failed: {source}")]
    StoreFailure {
        operation: &'static str,
        #[source]
        source: Box<DomainError>,
    },

    #[error("{operation} matched no rows for id {id}")]
    ZeroAffectedRows { operation: &'static str, id: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown job: {0}")]
    UnknownJob(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Attach the name of the failing operation to a store error.
    ///
    /// Already-classified failures (zero rows, validation, wrapped errors)
    /// pass through untouched.
    pub fn in_operation(self, operation: &'static str) -> Self {
        match self {
            Self::DatabaseError(_) | Self::SerializationError(_) => Self::StoreFailure {
                operation,
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// Whether the error means "nothing to do" rather than "could not do".
    pub const fn is_zero_affected(&self) -> bool {
        matches!(self, Self::ZeroAffectedRows { .. })
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
