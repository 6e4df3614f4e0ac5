//! Broker message envelope.
//!
//! `{ "_meta": {...}, "data": {...} }`. The publisher wraps exactly once;
//! every consumer unwraps exactly once. Unknown `_meta` fields are ignored
//! on deserialize (`#[serde(default)]` on every field plus no `deny_unknown_fields`)
//! so a schema-version bump that adds a field never breaks an older consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::now_utc;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub message_id: String,
    /// Propagated as the alert's `alert_id` so every log line and every
    /// downstream message for one alert can be correlated.
    pub correlation_id: String,
    pub producer: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

impl Meta {
    pub fn new(correlation_id: impl Into<String>, producer: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            correlation_id: correlation_id.into(),
            producer: producer.into(),
            schema_version: CURRENT_SCHEMA_VERSION,
            occurred_at: now_utc(),
            retry_count: 0,
        }
    }

    pub fn with_incremented_retry(&self) -> Self {
        let mut next = self.clone();
        next.retry_count += 1;
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T, correlation_id: impl Into<String>, producer: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(correlation_id, producer),
            data,
        }
    }
}
