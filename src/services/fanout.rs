//! Bounded parallel hydration of an id list under one deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EntityId, FanoutConfig};

/// Loads many records concurrently.
///
/// Results come back in input order. A load that fails, panics or is
/// still running when the shared deadline passes is dropped from the
/// output; it never fails the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutHydrator {
    deadline: Duration,
    max_concurrency: usize,
}

impl FanoutHydrator {
    pub fn new(deadline: Duration, max_concurrency: usize) -> Self {
        Self {
            deadline,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_config(config: &FanoutConfig) -> Self {
        Self::new(Duration::from_secs(config.deadline_secs), config.max_concurrency)
    }

    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn hydrate<Id, T, F, Fut>(&self, ids: &[Id], loader: F) -> Vec<T>
    where
        Id: EntityId,
        T: Send + 'static,
        F: Fn(Id) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<T>> + Send + 'static,
    {
        if ids.is_empty() {
            return Vec::new();
        }

        let deadline = Instant::now() + self.deadline;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let loader = Arc::new(loader);

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let semaphore = semaphore.clone();
                let loader = loader.clone();
                let handle = tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| DomainError::ValidationFailed("Fan-out semaphore closed".to_string()))?;
                    loader(id).await
                });
                (id, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, mut handle) in handles {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(record))) => results.push(record),
                Ok(Ok(Err(err))) => {
                    debug!(layer = "fanout", id = %id, error = %err, "load failed, dropping item");
                }
                Ok(Err(join_err)) => {
                    warn!(layer = "fanout", id = %id, error = %join_err, "load task aborted, dropping item");
                }
                Err(_) => {
                    handle.abort();
                    debug!(layer = "fanout", id = %id, "deadline reached, dropping item");
                }
            }
        }

        debug!(layer = "fanout", requested = ids.len(), loaded = results.len(), "hydration finished");
        results
    }
}

impl Default for FanoutHydrator {
    fn default() -> Self {
        Self::from_config(&FanoutConfig::default())
    }
}
