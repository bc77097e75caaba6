//! CLI command implementations.

pub mod cron;
pub mod greeter;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::types::Commands;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use crate::infrastructure::ClientRegistry;
use crate::services::{EventRelay, GreeterService, JobRegistry, LoggingSubscriber, REPORT_COUNTS_JOB, WARM_INDEX_JOB};

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    clients: ClientRegistry,
    relay: EventRelay,
    pub service: GreeterService,
    pub jobs: JobRegistry,
    _logger: LoggerImpl,
}

impl AppContext {
    pub async fn bootstrap(config_file: Option<&Path>) -> Result<Self> {
        let config = ConfigLoader::load_with(config_file)?;
        let logger = LoggerImpl::init(&config.logging)?;

        let clients = ClientRegistry::connect(&config).await?;
        let repository = clients.greeter_repository();

        let jobs = JobRegistry::with_builtin_jobs(repository.clone())?;
        jobs.validate(&[WARM_INDEX_JOB, REPORT_COUNTS_JOB])
            .context("Job registry is incomplete")?;

        let relay = EventRelay::start(config.relay.capacity, Arc::new(LoggingSubscriber));
        let service = GreeterService::new(repository).with_events(relay.publisher());

        Ok(Self {
            clients,
            relay,
            service,
            jobs,
            _logger: logger,
        })
    }

    /// Drain the event relay, then close the clients.
    pub async fn shutdown(self) -> Result<()> {
        self.relay.shutdown().await?;
        self.clients.close().await;
        Ok(())
    }

    pub async fn dispatch(&self, command: Commands, json_mode: bool) -> Result<()> {
        let service = &self.service;
        match command {
            Commands::Create { name, status } => greeter::create(service, name, status, json_mode).await,
            Commands::Get { id } => greeter::get(service, id, json_mode).await,
            Commands::List { status, last_id, page_size, page } => {
                greeter::list(service, status, last_id, page_size, page, json_mode).await
            }
            Commands::UpdateStatus { id, status } => greeter::update_status(service, id, status, json_mode).await,
            Commands::Incr { id, delta, column } => greeter::incr(service, id, delta, &column, json_mode).await,
            Commands::Delete { id } => greeter::delete(service, id, json_mode).await,
            Commands::Count { status } => greeter::count(service, status, json_mode).await,
            Commands::Cron { job } => cron::execute(&self.jobs, job, json_mode).await,
        }
    }
}
