//! Wires the three resolvers and their TTL caches into a
//! `alertmesh_broker::Handler` consuming `alert.normalized` and publishing
//! `alert.enriched`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use alertmesh_broker::{Broker, Handler};
use alertmesh_kernel::queues::ALERT_ENRICHED;
use alertmesh_kernel::{AlertStatus, Envelope, Outcome};
use alertmesh_normalizer::NormalizedAlert;
use alertmesh_store::{
    context_cache::{asset_key, network_key, user_key},
    AlertStore, AssetContext, EnrichedContext, NetworkContext, TtlCache, UserContext,
};

use crate::resolver::{AssetResolver, NetworkResolver, UserResolver};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedAlert {
    #[serde(flatten)]
    pub normalized: NormalizedAlert,
    pub context: EnrichedContext,
}

pub struct ContextCollectorHandler {
    broker: Arc<dyn Broker>,
    alert_store: Arc<dyn AlertStore>,
    network_resolver: Arc<dyn NetworkResolver>,
    asset_resolver: Arc<dyn AssetResolver>,
    user_resolver: Arc<dyn UserResolver>,
    network_cache: TtlCache<NetworkContext>,
    asset_cache: TtlCache<AssetContext>,
    user_cache: TtlCache<UserContext>,
    ttl: Duration,
}

impl ContextCollectorHandler {
    pub fn new(
        broker: Arc<dyn Broker>,
        alert_store: Arc<dyn AlertStore>,
        network_resolver: Arc<dyn NetworkResolver>,
        asset_resolver: Arc<dyn AssetResolver>,
        user_resolver: Arc<dyn UserResolver>,
        ttl: Duration,
    ) -> Self {
        Self {
            broker,
            alert_store,
            network_resolver,
            asset_resolver,
            user_resolver,
            network_cache: TtlCache::new(),
            asset_cache: TtlCache::new(),
            user_cache: TtlCache::new(),
            ttl,
        }
    }

    async fn network_context(&self, subject: &str) -> Option<NetworkContext> {
        let key = network_key(subject);
        if let Some(hit) = self.network_cache.get(&key) {
            return Some(hit);
        }
        let resolved = self.network_resolver.resolve(subject).await?;
        self.network_cache.set(key, resolved.clone(), self.ttl);
        Some(resolved)
    }

    async fn asset_context(&self, subject: &str) -> Option<AssetContext> {
        let key = asset_key(subject);
        if let Some(hit) = self.asset_cache.get(&key) {
            return Some(hit);
        }
        let resolved = self.asset_resolver.resolve(subject).await?;
        self.asset_cache.set(key, resolved.clone(), self.ttl);
        Some(resolved)
    }

    async fn user_context(&self, subject: &str) -> Option<UserContext> {
        let key = user_key(subject);
        if let Some(hit) = self.user_cache.get(&key) {
            return Some(hit);
        }
        let resolved = self.user_resolver.resolve(subject).await?;
        self.user_cache.set(key, resolved.clone(), self.ttl);
        Some(resolved)
    }
}

#[async_trait]
impl Handler for ContextCollectorHandler {
    #[instrument(skip(self, envelope))]
    async fn handle(&self, envelope: Value) -> Outcome {
        let parsed: Result<Envelope<NormalizedAlert>, _> = serde_json::from_value(envelope);
        let envelope = match parsed {
            Ok(e) => e,
            Err(err) => return Outcome::fatal(format!("unparseable normalized payload: {err}")),
        };
        let normalized = envelope.data;
        let alert = &normalized.alert;

        let network_subject = alert.source_ip.as_deref().or(alert.destination_ip.as_deref());
        let network = match network_subject {
            Some(ip) => self.network_context(ip).await,
            None => Some(NetworkContext {
                is_internal: false,
                subnet: None,
                geolocation: None,
                reputation: None,
            }),
        };
        let asset = match &alert.asset_id {
            Some(id) => self.asset_context(id).await,
            None => None,
        };
        let user = match &alert.user_name {
            Some(name) => self.user_context(name).await,
            None => None,
        };

        let attempted = [alert.source_ip.is_some() || alert.destination_ip.is_some(), alert.asset_id.is_some(), alert.user_name.is_some()]
            .into_iter()
            .filter(|&attempted| attempted)
            .count();
        let resolved = [network.is_some(), asset.is_some(), user.is_some()]
            .into_iter()
            .filter(|&ok| ok)
            .count();
        let degraded = attempted > 0 && resolved < attempted;

        let context = EnrichedContext { network, asset, user };

        if let Err(err) = self
            .alert_store
            .advance_status(&alert.alert_id, AlertStatus::Enriched)
            .await
        {
            warn!(alert_id = %alert.alert_id, %err, "status advance failed");
            return Outcome::retryable(format!("store unavailable: {err}"));
        }

        let alert_id = alert.alert_id.clone();
        let payload = EnrichedAlert { normalized, context };
        let outgoing = Envelope::new(payload, alert_id, "context-collector");
        let outgoing = match serde_json::to_value(&outgoing) {
            Ok(v) => v,
            Err(err) => return Outcome::fatal(format!("could not serialize enriched payload: {err}")),
        };

        match self.broker.publish(ALERT_ENRICHED, outgoing).await {
            Ok(()) if degraded => Outcome::degraded("one or more resolvers failed"),
            Ok(()) => Outcome::Ok,
            Err(err) => Outcome::retryable(format!("publish failed: {err}")),
        }
    }
}
