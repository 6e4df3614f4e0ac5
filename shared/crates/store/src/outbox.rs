//! Idempotency for side effects keyed on `message_id` (§5 "Idempotency":
//! `alert_id` guards persisted rows, `message_id` guards side effects like
//! an outbound notification or a publish that must not be repeated on
//! redelivery).

use async_trait::async_trait;
use dashmap::DashSet;

#[async_trait]
pub trait Outbox: Send + Sync {
    /// Records `message_id` as seen. Returns `true` the first time a given
    /// id is recorded, `false` on every subsequent call — the caller uses
    /// this to skip a side effect it has already performed.
    async fn record_if_new(&self, message_id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    seen: DashSet<String>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Outbox for InMemoryOutbox {
    async fn record_if_new(&self, message_id: &str) -> bool {
        self.seen.insert(message_id.to_string())
    }
}
