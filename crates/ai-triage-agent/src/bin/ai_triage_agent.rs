//! AI Triage Agent stage binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use alertmesh_ai_triage_agent::AiTriageAgentHandler;
use alertmesh_broker::{Broker, InProcessBroker, Topology};
use alertmesh_kernel::queues::ALERT_CONTEXTUALIZED;
use alertmesh_kernel::StageConfig;
use alertmesh_llm_router::mock_client::ScriptedModelClient;
use alertmesh_llm_router::{CostTier, LlmRouter, ModelCapability, ModelCatalog, ModelSpec, RouterHealth};
use alertmesh_similarity_index::{HashingEmbedder, InMemoryVectorStore, SimilarityIndex};
use alertmesh_store::{InMemoryAlertStore, InMemoryTriageStore};

fn default_catalog(default_model: &str) -> ModelCatalog {
    ModelCatalog::new(vec![ModelSpec {
        model_id: default_model.to_string(),
        capability: ModelCapability {
            context_window: 32_768,
            strengths: vec!["triage".to_string(), "general".to_string()],
            cost_tier: CostTier::Medium,
            max_complexity: 100,
        },
    }])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StageConfig::load("ai-triage-agent")?;
    info!(prefetch = config.prefetch_count, "starting ai triage agent");

    let broker = Arc::new(InProcessBroker::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    broker.declare_topology(&Topology::standard()).await?;

    let alert_store = Arc::new(InMemoryAlertStore::new());
    let triage_store = Arc::new(InMemoryTriageStore::new());

    // No real model endpoint is configured by default; `ScriptedModelClient`
    // with no scripted responses always returns a fatal call error, which
    // routes every alert through the rule-based fallback until a real
    // `ModelClient` is wired in for a deployment.
    let router = Arc::new(LlmRouter::new(
        default_catalog(&config.llm_default_model),
        RouterHealth::new(Duration::from_secs(60), 0.5, 5),
        Arc::new(ScriptedModelClient::new(vec![])),
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_seconds),
    ));
    let similarity_index = Arc::new(SimilarityIndex::new(
        Box::new(HashingEmbedder::new(384)),
        Box::new(InMemoryVectorStore::new()),
    ));

    let handler = Arc::new(AiTriageAgentHandler::new(
        broker.clone(),
        alert_store,
        triage_store,
        router,
        similarity_index,
        config.similarity_top_k,
        config.similarity_threshold,
        Some(config.llm_default_model.clone()),
    ));

    let consumer = broker
        .consume(ALERT_CONTEXTUALIZED, config.prefetch_count, handler)
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight work");
    consumer
        .shutdown(Duration::from_secs(config.drain_timeout_seconds))
        .await;

    Ok(())
}
