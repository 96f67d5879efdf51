//! Out-of-band pool events.
//!
//! Errors raised by idle connections have no caller waiting on them. They are
//! published on a broadcast channel and consumed by a logging task instead of
//! being returned to whoever happens to acquire next.

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::metrics::PoolMetrics;

/// Capacity of the pool event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// An error raised by a connection while it sat idle in the pool.
#[derive(Debug, Clone, thiserror::Error)]
#[error("idle connection failed after {idle_for:?} idle: {message}")]
pub struct IdlePoolError {
    /// Driver error message
    pub message: String,
    /// How long the connection had been idle
    pub idle_for: Duration,
    /// Total age of the connection
    pub age: Duration,
}

impl IdlePoolError {
    pub fn new(error: &sqlx::Error, idle_for: Duration, age: Duration) -> Self {
        Self {
            message: error.to_string(),
            idle_for,
            age,
        }
    }
}

/// Events emitted by the pool outside of any caller's request.
#[derive(Debug, Clone)]
pub enum PoolEvent {
    IdleConnectionError(IdlePoolError),
}

pub type PoolEventReceiver = broadcast::Receiver<PoolEvent>;

/// Publishing side of the pool event channel.
#[derive(Debug, Clone)]
pub struct PoolEventSender {
    tx: broadcast::Sender<PoolEvent>,
}

impl PoolEventSender {
    pub fn channel() -> (Self, PoolEventReceiver) {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    /// Attach another observer.
    pub fn subscribe(&self) -> PoolEventReceiver {
        self.tx.subscribe()
    }

    /// Publish an idle connection error. Never fails; with no observer
    /// attached the event is dropped after being counted.
    pub fn idle_error(&self, error: IdlePoolError) {
        PoolMetrics::record_idle_error();
        let _ = self.tx.send(PoolEvent::IdleConnectionError(error));
    }
}

/// Spawn the observer that logs pool events.
///
/// The task ends once every sender, i.e. every clone of the pool, is dropped.
pub fn spawn_event_logger(mut events: PoolEventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PoolEvent::IdleConnectionError(err)) => {
                    tracing::error!(
                        error = %err.message,
                        idle_for_ms = err.idle_for.as_millis() as u64,
                        age_ms = err.age.as_millis() as u64,
                        "Unexpected error on idle database connection"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Pool event logger lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }

        tracing::debug!("Pool event logger stopped");
    })
}
