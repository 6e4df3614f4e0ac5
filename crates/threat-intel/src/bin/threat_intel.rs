//! Threat-Intel Aggregator stage binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use alertmesh_broker::{Broker, InProcessBroker, Topology};
use alertmesh_kernel::queues::ALERT_ENRICHED;
use alertmesh_kernel::StageConfig;
use alertmesh_store::InMemoryAlertStore;
use alertmesh_threat_intel::mock_provider::MockThreatIntelProvider;
use alertmesh_threat_intel::{ProviderRegistry, ThreatIntelHandler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StageConfig::load("threat-intel")?;
    info!(prefetch = config.prefetch_count, "starting threat-intel aggregator");

    let broker = Arc::new(InProcessBroker::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    broker.declare_topology(&Topology::standard()).await?;

    let alert_store = Arc::new(InMemoryAlertStore::new());
    let registry = ProviderRegistry::new(
        vec![Arc::new(MockThreatIntelProvider::new("osint-mock", Vec::<String>::new()))],
        config.prefetch_count as usize,
        Duration::from_secs(5),
        Duration::from_secs(config.threat_intel_cache_ttl_seconds),
    );
    let handler = Arc::new(ThreatIntelHandler::new(broker.clone(), alert_store, registry));

    let consumer = broker
        .consume(ALERT_ENRICHED, config.prefetch_count, handler)
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight work");
    consumer
        .shutdown(Duration::from_secs(config.drain_timeout_seconds))
        .await;

    Ok(())
}
