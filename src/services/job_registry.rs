//! Named scheduled jobs, looked up by name from the `cron` command.
//!
//! Jobs may run more than once for the same schedule tick and must be
//! idempotent.

use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CacheEntity;
use crate::services::repository::CachedRepository;

pub type Job = Arc<dyn Fn() -> BoxFuture<'static, DomainResult<()>> + Send + Sync>;

pub const WARM_INDEX_JOB: &str = "warm_index";
pub const REPORT_COUNTS_JOB: &str = "report_counts";

#[derive(Default, Clone)]
pub struct JobRegistry {
    jobs: BTreeMap<String, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in cache maintenance jobs for `repository`.
    pub fn with_builtin_jobs<E: CacheEntity>(repository: CachedRepository<E>) -> DomainResult<Self> {
        let mut registry = Self::new();

        let repo = repository.clone();
        registry.register(WARM_INDEX_JOB, move || -> BoxFuture<'static, DomainResult<()>> {
            let repo = repo.clone();
            Box::pin(async move {
                for status in E::STATUSES {
                    let size = repo.warm_index(*status).await?;
                    info!(layer = "cron", job = WARM_INDEX_JOB, status, size, "partition warmed");
                }
                Ok::<(), DomainError>(())
            })
        })?;

        registry.register(REPORT_COUNTS_JOB, move || -> BoxFuture<'static, DomainResult<()>> {
            let repo = repository.clone();
            Box::pin(async move {
                for status in E::STATUSES {
                    let count = repo.count_by_status(*status).await?;
                    info!(layer = "cron", job = REPORT_COUNTS_JOB, entity = E::CACHE_PREFIX, status, count, "status count");
                }
                Ok::<(), DomainError>(())
            })
        })?;

        Ok(registry)
    }

    /// Add a job. Names must be non-empty and unique.
    pub fn register<F>(&mut self, name: &str, job: F) -> DomainResult<()>
    where
        F: Fn() -> BoxFuture<'static, DomainResult<()>> + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed("Job name must not be empty".to_string()));
        }
        if self.jobs.contains_key(name) {
            return Err(DomainError::ValidationFailed(format!("Job already registered: {name}")));
        }
        self.jobs.insert(name.to_string(), Arc::new(job));
        Ok(())
    }

    /// Check that every job in `required` is registered.
    pub fn validate(&self, required: &[&str]) -> DomainResult<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.jobs.contains_key(*name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ValidationFailed(format!(
                "Missing jobs: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub async fn run(&self, name: &str) -> DomainResult<()> {
        let job = self
            .jobs
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownJob(name.to_string()))?;

        info!(layer = "cron", job = name, "job started");
        job().await?;
        info!(layer = "cron", job = name, "job finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_register_and_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = JobRegistry::new();

        let counter = calls.clone();
        registry
            .register("tick", move || -> BoxFuture<'static, DomainResult<()>> {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), DomainError>(())
                })
            })
            .unwrap();

        registry.run("tick").await.unwrap();
        registry.run("tick").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.names(), vec!["tick"]);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let registry = JobRegistry::new();
        let err = registry.run("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownJob(name) if name == "missing"));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_names() {
        let mut registry = JobRegistry::new();
        let noop = || -> BoxFuture<'static, DomainResult<()>> { Box::pin(async { Ok(()) }) };

        assert!(registry.register("  ", noop).is_err());
        registry.register("once", noop).unwrap();
        assert!(registry.register("once", noop).is_err());
    }

    #[test]
    fn test_validate_reports_missing() {
        let mut registry = JobRegistry::new();
        registry
            .register("a", || -> BoxFuture<'static, DomainResult<()>> { Box::pin(async { Ok(()) }) })
            .unwrap();

        assert!(registry.validate(&["a"]).is_ok());
        let err = registry.validate(&["a", "b", "c"]).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Missing jobs: b, c");
    }
}
