//! Alertmesh Broker
//!
//! Declares the topology from the design (`Q`, `Q.retry`, `Q.dlq` per
//! primary queue) and the publish/consume contract every stage uses to
//! talk to it. `InProcessBroker` is the default, fully in-memory backend
//! used by every stage binary and by the integration tests; a production
//! deployment swaps it for a durable AMQP-0.9.1 backend behind the same
//! `Broker` trait without changing a single stage.

pub mod dead_letter;
pub mod error;
pub mod in_process;
pub mod topology;

use async_trait::async_trait;
use serde_json::Value;

pub use dead_letter::DeadLetter;
pub use error::{ConsumeError, PublishError};
pub use in_process::InProcessBroker;
pub use topology::Topology;

use alertmesh_kernel::Outcome;

/// A stage's message handler. Implementors decode the envelope, do the
/// stage's work, and return one of the four outcomes; the broker adapter
/// alone translates that into ack / nack-to-retry / dead-letter.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, envelope: Value) -> Outcome;
}

/// The publish/consume contract every stage depends on.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Declares the topology idempotently. Safe to call on every startup.
    async fn declare_topology(&self, topology: &Topology) -> Result<(), PublishError>;

    /// Publishes `payload` (an already-serialized envelope) to `queue`,
    /// waiting for a publisher confirm within the broker's configured
    /// deadline.
    async fn publish(&self, queue: &str, payload: Value) -> Result<(), PublishError>;

    /// Starts a consumer on `queue` with `prefetch` in-flight deliveries,
    /// dispatching each decoded envelope to `handler`. Returns a handle
    /// that can be used to request a graceful shutdown.
    async fn consume(
        &self,
        queue: &str,
        prefetch: u16,
        handler: std::sync::Arc<dyn Handler>,
    ) -> Result<ConsumerHandle, ConsumeError>;

    /// Drains every dead-lettered message currently parked on `queue`'s
    /// DLQ. Used by tests and by operational tooling; not part of the
    /// steady-state data path.
    async fn drain_dlq(&self, queue: &str) -> Vec<DeadLetter>;
}

/// A handle to a running consumer task.
pub struct ConsumerHandle {
    shutdown: tokio::sync::watch::Sender<bool>,
    join: tokio::task::JoinHandle<()>,
}

impl ConsumerHandle {
    pub fn new(shutdown: tokio::sync::watch::Sender<bool>, join: tokio::task::JoinHandle<()>) -> Self {
        Self { shutdown, join }
    }

    /// Stops the consumer from accepting new deliveries and waits up to
    /// `drain_timeout` for in-flight handlers to finish.
    pub async fn shutdown(self, drain_timeout: std::time::Duration) {
        let _ = self.shutdown.send(true);
        let _ = tokio::time::timeout(drain_timeout, self.join).await;
    }
}
