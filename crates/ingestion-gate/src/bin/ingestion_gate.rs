//! Ingestion Gate stage binary: the only stage process that binds a TCP
//! listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use alertmesh_broker::{Broker, InProcessBroker, Topology};
use alertmesh_ingestion_gate::{build_router, AppState, GateMetrics, RateLimiter};
use alertmesh_kernel::StageConfig;
use alertmesh_store::InMemoryAlertStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StageConfig::load("ingestion-gate")?;
    info!(rate_limit = config.rate_limit_per_minute, "starting ingestion gate");

    let broker = Arc::new(InProcessBroker::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    broker.declare_topology(&Topology::standard()).await?;

    let state = AppState {
        broker,
        alert_store: Arc::new(InMemoryAlertStore::new()),
        rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute)),
        metrics: Arc::new(GateMetrics::new()),
        clock_skew: chrono::Duration::seconds(config.clock_skew_seconds),
        batch_limit: 100,
    };

    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let addr: SocketAddr = "0.0.0.0:8080".parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "ingestion gate listening");

    axum::serve(listener, app).await?;

    Ok(())
}
