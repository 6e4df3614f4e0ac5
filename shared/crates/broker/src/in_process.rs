//! In-process broker: the default backend, and the one every stage binary
//! and integration test runs against. It honours the same durability
//! vocabulary as a real AMQP-0.9.1 broker (the `Topology`, retry-with-
//! backoff, dead-lettering, bounded prefetch) without requiring an
//! external process, so a single-box deployment or a test run doesn't
//! need one. A production multi-host deployment implements `Broker` with
//! a real AMQP client against the identical topology.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tracing::{debug, error, instrument, warn};

use crate::dead_letter::DeadLetter;
use crate::error::{ConsumeError, PublishError};
use crate::topology::Topology;
use crate::{Broker, ConsumerHandle, Handler};

struct Queue {
    sender: mpsc::UnboundedSender<Value>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Value>>>,
}

pub struct InProcessBroker {
    max_retries: u32,
    retry_backoff_base: Duration,
    queues: DashMap<String, Arc<Queue>>,
    dlqs: DashMap<String, Arc<Mutex<Vec<DeadLetter>>>>,
}

impl InProcessBroker {
    pub fn new(max_retries: u32, retry_backoff_base: Duration) -> Self {
        Self {
            max_retries,
            retry_backoff_base,
            queues: DashMap::new(),
            dlqs: DashMap::new(),
        }
    }

    fn queue(&self, name: &str) -> Result<Arc<Queue>, PublishError> {
        self.queues
            .get(name)
            .map(|q| q.clone())
            .ok_or_else(|| PublishError::UnknownQueue(name.to_string()))
    }

    fn retry_count(envelope: &Value) -> u32 {
        envelope["_meta"]["retry_count"].as_u64().unwrap_or(0) as u32
    }

    fn with_incremented_retry(mut envelope: Value) -> Value {
        let count = Self::retry_count(&envelope) + 1;
        if let Some(meta) = envelope.get_mut("_meta") {
            meta["retry_count"] = Value::from(count);
        }
        envelope
    }

}

#[async_trait]
impl Broker for InProcessBroker {
    #[instrument(skip(self, topology))]
    async fn declare_topology(&self, topology: &Topology) -> Result<(), PublishError> {
        for spec in &topology.queues {
            if !self.queues.contains_key(&spec.name) {
                let (sender, receiver) = mpsc::unbounded_channel();
                self.queues.insert(
                    spec.name.clone(),
                    Arc::new(Queue {
                        sender,
                        receiver: Mutex::new(Some(receiver)),
                    }),
                );
            }
            self.dlqs
                .entry(spec.name.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new())));
        }
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: Value) -> Result<(), PublishError> {
        let q = self.queue(queue)?;
        q.sender
            .send(payload)
            .map_err(|_| PublishError::ConnectionUnavailable(queue.to_string()))?;
        Ok(())
    }

    async fn consume(
        &self,
        queue: &str,
        prefetch: u16,
        handler: Arc<dyn Handler>,
    ) -> Result<ConsumerHandle, ConsumeError> {
        let q = self
            .queues
            .get(queue)
            .map(|q| q.clone())
            .ok_or_else(|| ConsumeError::UnknownQueue(queue.to_string()))?;
        let mut receiver = q
            .receiver
            .try_lock()
            .map_err(|_| ConsumeError::ConnectionUnavailable(format!("{queue} already has a consumer")))?
            .take()
            .ok_or_else(|| ConsumeError::ConnectionUnavailable(format!("{queue} already has a consumer")))?;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let semaphore = Arc::new(Semaphore::new(prefetch.max(1) as usize));
        let max_retries = self.max_retries;
        let retry_backoff_base = self.retry_backoff_base;
        let retry_sender = q.sender.clone();
        let queue_name = queue.to_string();

        // The DLQ map and queue map live behind `self` for the lifetime of
        // the broker; the consumer task needs its own handle to push
        // dead-letters, so it reaches back through a cloned `Arc` view
        // built from the same dashmap entries rather than `self` (which is
        // a `&self` borrow that cannot outlive this call).
        let dlq = self
            .dlqs
            .get(queue)
            .map(|d| d.clone())
            .unwrap_or_else(|| unreachable!("declare_topology always creates a dlq entry"));

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            debug!(queue = %queue_name, "consumer received shutdown signal");
                            break;
                        }
                    }
                    maybe_envelope = receiver.recv() => {
                        let Some(envelope) = maybe_envelope else { break };
                        let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
                        let handler = handler.clone();
                        let retry_sender = retry_sender.clone();
                        let dlq = dlq.clone();
                        let queue_name = queue_name.clone();
                        tokio::spawn(async move {
                            let _permit = permit;
                            let outcome = handler.handle(envelope.clone()).await;
                            match outcome {
                                alertmesh_kernel::Outcome::Ok | alertmesh_kernel::Outcome::Degraded { .. } => {}
                                alertmesh_kernel::Outcome::Fatal { reason } => {
                                    warn!(queue = %queue_name, %reason, "routing message to DLQ: fatal");
                                    let retry_count = InProcessBroker::retry_count(&envelope);
                                    dlq.lock().await.push(DeadLetter {
                                        queue: queue_name.clone(),
                                        envelope,
                                        reason,
                                        retry_count,
                                        fatal: true,
                                    });
                                }
                                alertmesh_kernel::Outcome::Retryable { reason } => {
                                    let bumped = InProcessBroker::with_incremented_retry(envelope);
                                    let retry_count = InProcessBroker::retry_count(&bumped);
                                    if retry_count >= max_retries {
                                        warn!(queue = %queue_name, %reason, retry_count, "retry budget exhausted, routing to DLQ");
                                        dlq.lock().await.push(DeadLetter {
                                            queue: queue_name,
                                            envelope: bumped,
                                            reason,
                                            retry_count,
                                            fatal: false,
                                        });
                                    } else {
                                        let delay = retry_backoff_base * 2u32.pow(retry_count.saturating_sub(1));
                                        debug!(queue = %queue_name, %reason, retry_count, delay_ms = delay.as_millis() as u64, "scheduling redelivery");
                                        tokio::spawn(async move {
                                            tokio::time::sleep(delay).await;
                                            if retry_sender.send(bumped).is_err() {
                                                error!(queue = %queue_name, "redelivery failed: channel closed");
                                            }
                                        });
                                    }
                                }
                            }
                        });
                    }
                }
            }
        });

        Ok(ConsumerHandle::new(shutdown_tx, join))
    }

    async fn drain_dlq(&self, queue: &str) -> Vec<DeadLetter> {
        match self.dlqs.get(queue) {
            Some(dlq) => std::mem::take(&mut *dlq.lock().await),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for InProcessBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessBroker")
            .field("max_retries", &self.max_retries)
            .field("queue_count", &self.queues.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Handler;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicU32>,
        outcome_for_call: fn(u32) -> alertmesh_kernel::Outcome,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(&self, _envelope: Value) -> alertmesh_kernel::Outcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            (self.outcome_for_call)(call)
        }
    }

    fn sample_envelope() -> Value {
        serde_json::json!({
            "_meta": { "message_id": "m1", "correlation_id": "ALT-1", "producer": "test", "schema_version": 1, "occurred_at": "2026-01-01T00:00:00Z", "retry_count": 0 },
            "data": { "hello": "world" }
        })
    }

    #[tokio::test]
    async fn ok_outcome_does_not_reach_dlq() {
        let broker = InProcessBroker::new(3, Duration::from_millis(1));
        let topology = Topology::standard();
        broker.declare_topology(&topology).await.unwrap();

        let calls = Arc::new(AtomicU32::new(0));
        let handler = Arc::new(CountingHandler {
            calls: calls.clone(),
            outcome_for_call: |_| alertmesh_kernel::Outcome::Ok,
        });

        let handle = broker.consume("alert.raw", 10, handler).await.unwrap();
        broker.publish("alert.raw", sample_envelope()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.shutdown(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(broker.drain_dlq("alert.raw").await.is_empty());
    }

    #[tokio::test]
    async fn fatal_outcome_routes_directly_to_dlq() {
        let broker = InProcessBroker::new(3, Duration::from_millis(1));
        broker.declare_topology(&Topology::standard()).await.unwrap();

        let handler = Arc::new(CountingHandler {
            calls: Arc::new(AtomicU32::new(0)),
            outcome_for_call: |_| alertmesh_kernel::Outcome::fatal("unparseable payload"),
        });

        let handle = broker.consume("alert.raw", 10, handler).await.unwrap();
        broker.publish("alert.raw", sample_envelope()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.shutdown(Duration::from_millis(50)).await;

        let dead = broker.drain_dlq("alert.raw").await;
        assert_eq!(dead.len(), 1);
        assert!(dead[0].fatal);
    }

    #[tokio::test]
    async fn retryable_outcome_exhausts_budget_then_dlqs() {
        let broker = InProcessBroker::new(2, Duration::from_millis(5));
        broker.declare_topology(&Topology::standard()).await.unwrap();

        let handler = Arc::new(CountingHandler {
            calls: Arc::new(AtomicU32::new(0)),
            outcome_for_call: |_| alertmesh_kernel::Outcome::retryable("downstream timeout"),
        });

        let handle = broker.consume("alert.raw", 10, handler).await.unwrap();
        broker.publish("alert.raw", sample_envelope()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown(Duration::from_millis(50)).await;

        let dead = broker.drain_dlq("alert.raw").await;
        assert_eq!(dead.len(), 1);
        assert!(!dead[0].fatal);
        assert!(dead[0].retry_count >= 2);
    }
}
