//! Wires the provider registry into a `alertmesh_broker::Handler` consuming
//! `alert.enriched` and publishing `alert.contextualized`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use alertmesh_broker::{Broker, Handler};
use alertmesh_context_collector::EnrichedAlert;
use alertmesh_kernel::queues::ALERT_CONTEXTUALIZED;
use alertmesh_kernel::{AlertStatus, Envelope, Outcome};
use alertmesh_store::AlertStore;

use crate::aggregate::{aggregate_ioc, alert_level_score, AggregatedIoc};
use crate::registry::ProviderRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualizedAlert {
    #[serde(flatten)]
    pub enriched: EnrichedAlert,
    pub findings: Vec<AggregatedIoc>,
    pub threat_score: u8,
}

pub struct ThreatIntelHandler {
    broker: Arc<dyn Broker>,
    alert_store: Arc<dyn AlertStore>,
    registry: ProviderRegistry,
}

impl ThreatIntelHandler {
    pub fn new(broker: Arc<dyn Broker>, alert_store: Arc<dyn AlertStore>, registry: ProviderRegistry) -> Self {
        Self {
            broker,
            alert_store,
            registry,
        }
    }
}

fn all_iocs(enriched: &EnrichedAlert) -> Vec<String> {
    let iocs = &enriched.normalized.iocs;
    iocs.ips
        .iter()
        .chain(iocs.hashes.iter())
        .chain(iocs.urls.iter())
        .chain(iocs.domains.iter())
        .chain(iocs.emails.iter())
        .cloned()
        .collect()
}

#[async_trait]
impl Handler for ThreatIntelHandler {
    #[instrument(skip(self, envelope))]
    async fn handle(&self, envelope: Value) -> Outcome {
        let parsed: Result<Envelope<EnrichedAlert>, _> = serde_json::from_value(envelope);
        let envelope = match parsed {
            Ok(e) => e,
            Err(err) => return Outcome::fatal(format!("unparseable enriched payload: {err}")),
        };
        let enriched = envelope.data;
        let alert_id = enriched.normalized.alert.alert_id.clone();

        let iocs = all_iocs(&enriched);
        let mut findings = Vec::with_capacity(iocs.len());
        for ioc in &iocs {
            let per_provider = self.registry.lookup_all(ioc).await;
            findings.push(aggregate_ioc(ioc, &per_provider));
        }
        let threat_score = alert_level_score(&findings);

        // Threat-intel has no dedicated pipeline status of its own (§3's
        // `AlertStatus` moves straight from `Enriched` to `Analyzed`); this
        // lookup only confirms the row still exists before publishing on.
        match self.alert_store.get(&alert_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Outcome::fatal(format!("alert {alert_id} not found in store")),
            Err(err) => {
                warn!(%alert_id, %err, "store unavailable");
                return Outcome::retryable(format!("store unavailable: {err}"));
            }
        }

        let payload = ContextualizedAlert {
            enriched,
            findings,
            threat_score,
        };
        let outgoing = Envelope::new(payload, alert_id, "threat-intel");
        let outgoing = match serde_json::to_value(&outgoing) {
            Ok(v) => v,
            Err(err) => return Outcome::fatal(format!("could not serialize contextualized payload: {err}")),
        };

        match self.broker.publish(ALERT_CONTEXTUALIZED, outgoing).await {
            Ok(()) => Outcome::Ok,
            Err(err) => Outcome::retryable(format!("publish failed: {err}")),
        }
    }
}
