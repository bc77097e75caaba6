//! Owned bounded relay queue between request handlers and subscribers.
//!
//! One [`EventRelay`] owns both ends of the channel and the consumer task.
//! Shutdown closes the queue to new events, drains what is already queued
//! and waits for the consumer, so send-after-close surfaces as
//! [`RelayError::Closed`] instead of a panic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;

/// Events published after successful greeter writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GreeterEvent {
    Created { id: i32, name: String },
    CountUpdated { id: i32, column: String, delta: i32 },
}

impl GreeterEvent {
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Created { .. } => "greeter_create",
            Self::CountUpdated { .. } => "greeter_update_count",
        }
    }

    pub const fn id(&self) -> i32 {
        match self {
            Self::Created { id, .. } | Self::CountUpdated { id, .. } => *id,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Relay queue is closed")]
    Closed,

    #[error("Relay consumer failed: {0}")]
    Consumer(String),
}

/// Receives every relayed event, one at a time, in publish order.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle(&self, event: &GreeterEvent) -> DomainResult<()>;
}

/// Logs each event and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubscriber;

#[async_trait]
impl EventSubscriber for LoggingSubscriber {
    async fn handle(&self, event: &GreeterEvent) -> DomainResult<()> {
        let body = serde_json::to_string(event)?;
        debug!(layer = "subscriber", topic = event.topic(), key = event.id(), body = %body, "event received");
        Ok(())
    }
}

/// Cloneable producer handle for an [`EventRelay`].
#[derive(Clone)]
pub struct RelayPublisher {
    sender: mpsc::Sender<GreeterEvent>,
}

impl RelayPublisher {
    /// Queue `event`, waiting for space when the queue is full.
    pub async fn publish(&self, event: GreeterEvent) -> Result<(), RelayError> {
        self.sender.send(event).await.map_err(|_| RelayError::Closed)
    }
}

pub struct EventRelay {
    publisher: RelayPublisher,
    shutdown: oneshot::Sender<()>,
    consumer: JoinHandle<u64>,
}

impl EventRelay {
    /// Spawn the consumer task over a queue of `capacity` events.
    pub fn start(capacity: usize, subscriber: Arc<dyn EventSubscriber>) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (shutdown, shutdown_rx) = oneshot::channel();
        let consumer = tokio::spawn(consume(receiver, shutdown_rx, subscriber));
        info!(layer = "relay", capacity, "event relay started");

        Self {
            publisher: RelayPublisher { sender },
            shutdown,
            consumer,
        }
    }

    pub fn publisher(&self) -> RelayPublisher {
        self.publisher.clone()
    }

    pub async fn publish(&self, event: GreeterEvent) -> Result<(), RelayError> {
        self.publisher.publish(event).await
    }

    /// Close the queue, deliver everything already queued and stop the
    /// consumer. Returns the number of events delivered over the relay's
    /// lifetime.
    pub async fn shutdown(self) -> Result<u64, RelayError> {
        // The consumer also treats a dropped signal as shutdown.
        let _ = self.shutdown.send(());
        let delivered = self
            .consumer
            .await
            .map_err(|e| RelayError::Consumer(e.to_string()))?;
        info!(layer = "relay", delivered, "event relay stopped");
        Ok(delivered)
    }
}

async fn consume(
    mut receiver: mpsc::Receiver<GreeterEvent>,
    mut shutdown: oneshot::Receiver<()>,
    subscriber: Arc<dyn EventSubscriber>,
) -> u64 {
    let mut delivered = 0u64;
    let mut closing = false;

    loop {
        tokio::select! {
            biased;
            event = receiver.recv() => {
                let Some(event) = event else { break };
                if let Err(err) = subscriber.handle(&event).await {
                    warn!(layer = "relay", topic = event.topic(), error = %err, "subscriber failed");
                }
                delivered += 1;
            }
            _ = &mut shutdown, if !closing => {
                receiver.close();
                closing = true;
                debug!(layer = "relay", "relay closing, draining queue");
            }
        }
    }

    delivered
}
