//! Wires field mapping, IOC extraction, fingerprinting and dedup into a
//! `alertmesh_broker::Handler` consuming `alert.raw` and publishing
//! `alert.normalized`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use alertmesh_broker::{Broker, Handler};
use alertmesh_kernel::{
    queues::ALERT_NORMALIZED, time, Alert, AlertStatus, Envelope, Fingerprint, Outcome,
};
use alertmesh_store::AlertStore;

use crate::dedup::DedupWindow;
use crate::ioc::{self, IocSet};
use crate::{alert_type, field_mapping};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAlert {
    pub alert: Alert,
    pub iocs: IocSet,
    pub fingerprint: String,
}

pub struct NormalizerHandler {
    broker: Arc<dyn Broker>,
    alert_store: Arc<dyn AlertStore>,
    dedup: DedupWindow,
}

impl NormalizerHandler {
    pub fn new(broker: Arc<dyn Broker>, alert_store: Arc<dyn AlertStore>, dedup_capacity: usize) -> Self {
        Self {
            broker,
            alert_store,
            dedup: DedupWindow::new(dedup_capacity),
        }
    }

    /// Maps a raw vendor JSON object onto a canonical `Alert`. Fields that
    /// survive mapping but have no canonical home are kept in
    /// `alert_metadata` so nothing from the original submission is lost.
    fn map_to_alert(&self, raw: &Value, received_at: chrono::DateTime<chrono::Utc>) -> Alert {
        let mapped = field_mapping::apply(raw);
        let str_field = |key: &str| mapped.get(key).and_then(Value::as_str).map(str::to_string);

        let alert_id = str_field("alert_id").unwrap_or_default();
        let alert_type = alert_type::from_vendor_str(&str_field("alert_type").unwrap_or_default());
        let severity = alertmesh_kernel::Severity::from_vendor_str(&str_field("severity").unwrap_or_default());
        let event_timestamp = str_field("event_timestamp")
            .and_then(|raw| time::parse_flexible(&raw))
            .unwrap_or_else(time::now_utc);

        let known_canonical: std::collections::HashSet<&str> =
            field_mapping::DEFAULT_MAPPINGS.iter().map(|m| m.canonical).collect();
        let mut alert_metadata = HashMap::new();
        if let Some(obj) = raw.as_object() {
            for (key, value) in obj {
                if !known_canonical.contains(key.as_str()) {
                    alert_metadata.insert(key.clone(), value.clone());
                }
            }
        }

        Alert {
            alert_id,
            received_at,
            event_timestamp,
            alert_type,
            severity,
            title: str_field("title"),
            description: str_field("description"),
            source_ip: str_field("source_ip"),
            destination_ip: str_field("destination_ip"),
            file_hash: str_field("file_hash"),
            url: str_field("url"),
            domain: str_field("domain"),
            asset_id: str_field("asset_id"),
            user_name: str_field("user_name"),
            status: AlertStatus::Normalized,
            alert_metadata,
        }
    }
}

#[async_trait]
impl Handler for NormalizerHandler {
    #[instrument(skip(self, envelope))]
    async fn handle(&self, envelope: Value) -> Outcome {
        let parsed: Result<Envelope<Value>, _> = serde_json::from_value(envelope);
        let envelope = match parsed {
            Ok(e) => e,
            Err(err) => return Outcome::fatal(format!("unparseable envelope: {err}")),
        };

        let alert = self.map_to_alert(&envelope.data, envelope.meta.occurred_at);
        if alert.alert_id.is_empty() {
            return Outcome::fatal("missing alert_id after field mapping");
        }

        let fingerprint = Fingerprint::compute(
            alert.alert_type,
            alert.source_ip.as_deref(),
            alert.destination_ip.as_deref(),
            alert.file_hash.as_deref(),
            alert.url.as_deref(),
            alert.asset_id.as_deref(),
            alert.user_name.as_deref(),
        );

        if self.dedup.check_and_insert(fingerprint) {
            debug!(alert_id = %alert.alert_id, fingerprint = %fingerprint, "duplicate fingerprint, acking without republish");
            return Outcome::Ok;
        }

        let text = [&alert.title, &alert.description]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let iocs = ioc::extract(&text);

        if let Err(err) = self.alert_store.insert_new(alert.clone()).await {
            warn!(alert_id = %alert.alert_id, %err, "could not ensure alert row exists");
            return Outcome::retryable(format!("store unavailable: {err}"));
        }
        if let Err(err) = self
            .alert_store
            .advance_status(&alert.alert_id, AlertStatus::Normalized)
            .await
        {
            warn!(alert_id = %alert.alert_id, %err, "status advance failed");
            return Outcome::retryable(format!("store unavailable: {err}"));
        }

        let payload = NormalizedAlert {
            alert: alert.clone(),
            iocs,
            fingerprint: fingerprint.as_hex(),
        };
        let outgoing = Envelope::new(payload, alert.alert_id.clone(), "normalizer");
        let outgoing = match serde_json::to_value(&outgoing) {
            Ok(v) => v,
            Err(err) => return Outcome::fatal(format!("could not serialize normalized payload: {err}")),
        };

        match self.broker.publish(ALERT_NORMALIZED, outgoing).await {
            Ok(()) => Outcome::Ok,
            Err(err) => Outcome::retryable(format!("publish failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertmesh_broker::{InProcessBroker, Topology};
    use alertmesh_store::InMemoryAlertStore;
    use serde_json::json;
    use std::time::Duration;

    fn raw_envelope(body: Value, alert_id: &str) -> Value {
        serde_json::to_value(Envelope::new(body, alert_id, "ingestion-gate")).unwrap()
    }

    #[tokio::test]
    async fn splunk_shaped_payload_maps_and_publishes() {
        let broker = Arc::new(InProcessBroker::new(3, Duration::from_millis(10)));
        broker.declare_topology(&Topology::standard()).await.unwrap();
        let store = Arc::new(InMemoryAlertStore::new());
        let handler = NormalizerHandler::new(broker.clone(), store.clone(), 1000);

        let raw = json!({
            "alert_id": "ALT-1",
            "category": "ransomware",
            "src_ip": "10.0.0.5",
            "severity": "crit",
        });
        let outcome = handler.handle(raw_envelope(raw, "ALT-1")).await;
        assert!(matches!(outcome, Outcome::Ok));

        let stored = store.get("ALT-1").await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Normalized);
        assert_eq!(stored.source_ip.as_deref(), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn duplicate_fingerprint_is_acked_without_republish() {
        let broker = Arc::new(InProcessBroker::new(3, Duration::from_millis(10)));
        broker.declare_topology(&Topology::standard()).await.unwrap();
        let store = Arc::new(InMemoryAlertStore::new());
        let handler = NormalizerHandler::new(broker, store, 1000);

        let raw = json!({ "alert_id": "ALT-1", "source_ip": "10.0.0.5" });
        handler.handle(raw_envelope(raw.clone(), "ALT-1")).await;
        let second = handler.handle(raw_envelope(raw, "ALT-1")).await;
        assert!(matches!(second, Outcome::Ok));
        assert_eq!(handler.dedup.len(), 1);
    }

    #[tokio::test]
    async fn missing_alert_id_is_fatal() {
        let broker = Arc::new(InProcessBroker::new(3, Duration::from_millis(10)));
        broker.declare_topology(&Topology::standard()).await.unwrap();
        let store = Arc::new(InMemoryAlertStore::new());
        let handler = NormalizerHandler::new(broker, store, 1000);

        let outcome = handler.handle(raw_envelope(json!({}), "unknown")).await;
        assert!(matches!(outcome, Outcome::Fatal { .. }));
    }
}
