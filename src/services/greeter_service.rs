//! Request handling for greeters: input validation, defaults and
//! user-facing error codes on top of [`CachedRepository`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::errors::DomainError;
use crate::domain::models::{CacheEntity, Greeter, ListQuery, Page, DEFAULT_PAGE_SIZE};
use crate::services::event_relay::{GreeterEvent, RelayPublisher};
use crate::services::repository::CachedRepository;

/// Numeric error codes returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    GreeterObjectIsEmpty,
    NameFieldIsEmpty,
    CreateGreeterFailed,
    FetchGreeterFailed,
    FetchGreeterListFailed,
    UpdateGreeterFailed,
    DeleteGreeterFailed,
    StatusIsInvalid,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        match self {
            Self::GreeterObjectIsEmpty => 10100,
            Self::NameFieldIsEmpty => 10101,
            Self::CreateGreeterFailed => 10102,
            Self::FetchGreeterFailed => 10103,
            Self::FetchGreeterListFailed => 10104,
            Self::UpdateGreeterFailed => 10105,
            Self::DeleteGreeterFailed => 10106,
            Self::StatusIsInvalid => 10107,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::GreeterObjectIsEmpty => "Greeter must not be empty",
            Self::NameFieldIsEmpty => "Name must not be empty",
            Self::CreateGreeterFailed => "Failed to create greeter",
            Self::FetchGreeterFailed => "Failed to fetch greeter",
            Self::FetchGreeterListFailed => "Failed to fetch greeter list",
            Self::UpdateGreeterFailed => "Failed to update greeter",
            Self::DeleteGreeterFailed => "Failed to delete greeter",
            Self::StatusIsInvalid => "Status is invalid",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Caller-visible failure: a code and a short message, no diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct GreeterService {
    repository: CachedRepository<Greeter>,
    events: Option<RelayPublisher>,
}

impl GreeterService {
    pub const fn new(repository: CachedRepository<Greeter>) -> Self {
        Self {
            repository,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, publisher: RelayPublisher) -> Self {
        self.events = Some(publisher);
        self
    }

    pub const fn repository(&self) -> &CachedRepository<Greeter> {
        &self.repository
    }

    pub async fn create(&self, draft: Greeter) -> ServiceResult<Greeter> {
        if draft.is_sentinel() {
            return Err(ErrorCode::GreeterObjectIsEmpty.into());
        }
        if draft.name.trim().is_empty() {
            warn!(layer = "greeter_service", "create rejected: empty name");
            return Err(ErrorCode::NameFieldIsEmpty.into());
        }

        let created = self
            .repository
            .create(&draft.stamped_now())
            .await
            .map_err(|e| failure(ErrorCode::CreateGreeterFailed, &e))?;

        self.publish(GreeterEvent::Created {
            id: created.id,
            name: created.name.clone(),
        })
        .await;
        Ok(created)
    }

    /// `None` when no greeter has this id.
    pub async fn get_by_id(&self, id: i32) -> ServiceResult<Option<Greeter>> {
        let found = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| failure(ErrorCode::FetchGreeterFailed, &e))?;
        Ok((!found.is_sentinel()).then_some(found))
    }

    /// Page of greeters with `status`. Non-positive sizes and pages fall
    /// back to 20 and 1; a non-positive `last_id` means no cursor.
    pub async fn get_list(
        &self,
        status: i32,
        last_id: i32,
        page_size: i32,
        page: i32,
    ) -> ServiceResult<Page<Greeter>> {
        if !Greeter::STATUSES.contains(&status) {
            warn!(layer = "greeter_service", status, "list rejected: invalid status");
            return Err(ErrorCode::StatusIsInvalid.into());
        }

        let page_size = u32::try_from(page_size).ok().filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let page = u32::try_from(page).ok().filter(|p| *p > 0).unwrap_or(1);
        let query = ListQuery::new(status, page_size, page).after(last_id.max(0));
        debug!(layer = "greeter_service", ?query, "list request");

        self.repository
            .get_list(query)
            .await
            .map_err(|e| failure(ErrorCode::FetchGreeterListFailed, &e))
    }

    pub async fn update_status(&self, id: i32, status: i32) -> ServiceResult<u64> {
        self.repository
            .update_status(id, status)
            .await
            .map_err(|e| failure(ErrorCode::UpdateGreeterFailed, &e))
    }

    pub async fn update_count(&self, id: i32, delta: i32, column: &str) -> ServiceResult<u64> {
        let affected = self
            .repository
            .update_count(id, delta, column)
            .await
            .map_err(|e| failure(ErrorCode::UpdateGreeterFailed, &e))?;

        self.publish(GreeterEvent::CountUpdated {
            id,
            column: column.to_string(),
            delta,
        })
        .await;
        Ok(affected)
    }

    pub async fn delete_by_id(&self, id: i32) -> ServiceResult<u64> {
        self.repository
            .delete_by_id(id)
            .await
            .map_err(|e| failure(ErrorCode::DeleteGreeterFailed, &e))
    }

    async fn publish(&self, event: GreeterEvent) {
        let Some(events) = &self.events else { return };
        let topic = event.topic();
        if let Err(err) = events.publish(event).await {
            warn!(layer = "greeter_service", topic, error = %err, "event not published");
        }
    }
}

/// Log the full error and hand back only the code.
fn failure(code: ErrorCode, err: &DomainError) -> ServiceError {
    if err.is_zero_affected() {
        warn!(layer = "greeter_service", code = code.code(), error = %err, "no rows affected");
    } else {
        error!(layer = "greeter_service", code = code.code(), error = %err, "request failed");
    }
    code.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_start_at_10100() {
        assert_eq!(ErrorCode::GreeterObjectIsEmpty.code(), 10100);
        assert_eq!(ErrorCode::StatusIsInvalid.code(), 10107);
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::from(ErrorCode::NameFieldIsEmpty);
        assert_eq!(err.to_string(), "[10101] Name must not be empty");
    }

    #[test]
    fn test_zero_affected_maps_to_operation_code() {
        let err = failure(
            ErrorCode::DeleteGreeterFailed,
            &DomainError::ZeroAffectedRows {
                operation: "greeter.delete_by_id",
                id: "9".to_string(),
            },
        );
        assert_eq!(err.code, ErrorCode::DeleteGreeterFailed);
        assert_eq!(err.message, "Failed to delete greeter");
    }
}
