//! Normalizer stage binary: wires `NormalizerHandler` to the broker and
//! runs until `SIGINT`/`SIGTERM`, then drains in-flight work before exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use alertmesh_broker::{Broker, InProcessBroker, Topology};
use alertmesh_kernel::queues::ALERT_RAW;
use alertmesh_kernel::StageConfig;
use alertmesh_normalizer::NormalizerHandler;
use alertmesh_store::InMemoryAlertStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StageConfig::load("normalizer")?;
    info!(prefetch = config.prefetch_count, "starting normalizer");

    let broker = Arc::new(InProcessBroker::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    broker.declare_topology(&Topology::standard()).await?;

    let alert_store = Arc::new(InMemoryAlertStore::new());
    let handler = Arc::new(NormalizerHandler::new(
        broker.clone(),
        alert_store,
        config.dedup_cache_size,
    ));

    let consumer = broker
        .consume(ALERT_RAW, config.prefetch_count, handler)
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight work");
    consumer
        .shutdown(Duration::from_secs(config.drain_timeout_seconds))
        .await;

    Ok(())
}
