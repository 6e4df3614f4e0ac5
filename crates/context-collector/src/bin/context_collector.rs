//! Context Collector stage binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use alertmesh_broker::{Broker, InProcessBroker, Topology};
use alertmesh_context_collector::mock_resolvers::{MockAssetResolver, MockUserResolver};
use alertmesh_context_collector::network::HeuristicNetworkResolver;
use alertmesh_context_collector::ContextCollectorHandler;
use alertmesh_kernel::queues::ALERT_NORMALIZED;
use alertmesh_kernel::StageConfig;
use alertmesh_store::InMemoryAlertStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StageConfig::load("context-collector")?;
    info!(prefetch = config.prefetch_count, "starting context collector");

    let broker = Arc::new(InProcessBroker::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    broker.declare_topology(&Topology::standard()).await?;

    let alert_store = Arc::new(InMemoryAlertStore::new());
    let handler = Arc::new(ContextCollectorHandler::new(
        broker.clone(),
        alert_store,
        Arc::new(HeuristicNetworkResolver),
        Arc::new(MockAssetResolver),
        Arc::new(MockUserResolver),
        Duration::from_secs(config.context_cache_ttl_seconds),
    ));

    let consumer = broker
        .consume(ALERT_NORMALIZED, config.prefetch_count, handler)
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight work");
    consumer
        .shutdown(Duration::from_secs(config.drain_timeout_seconds))
        .await;

    Ok(())
}
