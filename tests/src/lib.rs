//! Shared end-to-end harness. Wires every stage handler onto one
//! `InProcessBroker` so the scenarios under `tests/` can drive a submitted
//! alert through the full pipeline, with or without the HTTP ingestion
//! surface in front of it, and inspect what lands in the stores.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use alertmesh_ai_triage_agent::AiTriageAgentHandler;
use alertmesh_broker::{Broker, ConsumerHandle, Handler, InProcessBroker, Topology};
use alertmesh_context_collector::mock_resolvers::{MockAssetResolver, MockUserResolver};
use alertmesh_context_collector::network::HeuristicNetworkResolver;
use alertmesh_context_collector::ContextCollectorHandler;
use alertmesh_ingestion_gate::{AppState, GateMetrics, RateLimiter};
use alertmesh_kernel::queues::{ALERT_CONTEXTUALIZED, ALERT_ENRICHED, ALERT_NORMALIZED, ALERT_RAW, ALERT_RESULT};
use alertmesh_kernel::{alert, time, Alert, AlertStatus, AlertType, Envelope, Outcome, Severity};
use alertmesh_llm_router::mock_client::ScriptedModelClient;
use alertmesh_llm_router::{CostTier, LlmRouter, ModelCallError, ModelCapability, ModelCatalog, ModelSpec, RouterHealth};
use alertmesh_normalizer::NormalizerHandler;
use alertmesh_similarity_index::{HashingEmbedder, InMemoryVectorStore, SimilarityIndex};
use alertmesh_store::{AlertStore, InMemoryAlertStore, InMemoryTriageStore, TriageStore};
use alertmesh_threat_intel::mock_provider::MockThreatIntelProvider;
use alertmesh_threat_intel::{ProviderRegistry, ThreatIntelHandler};

/// A minimal, fully-populated `Alert` a test can mutate with struct-update
/// syntax instead of repeating every field.
pub fn base_alert(alert_id: &str, alert_type: AlertType, severity: Severity) -> Alert {
    Alert {
        alert_id: alert_id.to_string(),
        received_at: time::now_utc(),
        event_timestamp: time::now_utc(),
        alert_type,
        severity,
        title: None,
        description: None,
        source_ip: None,
        destination_ip: None,
        file_hash: None,
        url: None,
        domain: None,
        asset_id: None,
        user_name: None,
        status: AlertStatus::New,
        alert_metadata: Default::default(),
    }
}

/// Wraps a handler and counts every delivery it receives. Used to observe
/// how many times a consumer actually ran without attaching a second,
/// competing consumer to the same queue (`InProcessBroker` allows exactly
/// one consumer per queue).
pub struct CountingHandler<H> {
    inner: H,
    pub count: Arc<AtomicU32>,
}

impl<H> CountingHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            count: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for CountingHandler<H> {
    async fn handle(&self, envelope: Value) -> Outcome {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.handle(envelope).await
    }
}

/// Captures every envelope delivered to a terminal queue for inspection.
struct SinkHandler {
    received: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl Handler for SinkHandler {
    async fn handle(&self, envelope: Value) -> Outcome {
        self.received.lock().await.push(envelope);
        Outcome::Ok
    }
}

/// Wraps a handler and records a copy of every envelope it receives
/// before delegating, so a test can inspect an intermediate stage's input
/// (e.g. the enriched context) without intercepting the queue itself.
pub struct CapturingHandler<H> {
    inner: H,
    pub captured: Arc<Mutex<Vec<Value>>>,
}

impl<H> CapturingHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for CapturingHandler<H> {
    async fn handle(&self, envelope: Value) -> Outcome {
        self.captured.lock().await.push(envelope.clone());
        self.inner.handle(envelope).await
    }
}

/// Scripts the pipeline's only external call (the LLM) and the
/// threat-intel mock feed's known-bad indicator list; everything else
/// (network/asset/user resolvers, dedup window, similarity index) uses the
/// same built-ins the stage binaries wire up by default.
pub struct PipelineOptions {
    pub known_malicious: Vec<String>,
    pub model_responses: Vec<Result<String, ModelCallError>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            known_malicious: vec![],
            model_responses: vec![Ok(default_model_response())],
        }
    }
}

fn default_model_response() -> String {
    r#"{"score": 85, "level": "critical", "confidence": 0.92, "recommended_actions": [{"action": "isolate host", "priority": "immediate", "rationale": "known-bad hash on a high-criticality asset"}], "narrative": "high-confidence malware detection"}"#.to_string()
}

pub struct Pipeline {
    pub broker: Arc<InProcessBroker>,
    pub alert_store: Arc<InMemoryAlertStore>,
    pub triage_store: Arc<InMemoryTriageStore>,
    pub normalized_deliveries: Arc<AtomicU32>,
    enriched_captures: Arc<Mutex<Vec<Value>>>,
    contextualized_captures: Arc<Mutex<Vec<Value>>>,
    results: Arc<Mutex<Vec<Value>>>,
    _handles: Vec<ConsumerHandle>,
}

impl Pipeline {
    pub async fn spawn(opts: PipelineOptions) -> Self {
        let broker = Arc::new(InProcessBroker::new(3, Duration::from_millis(5)));
        broker.declare_topology(&Topology::standard()).await.unwrap();

        let alert_store = Arc::new(InMemoryAlertStore::new());
        let triage_store = Arc::new(InMemoryTriageStore::new());

        let normalizer = NormalizerHandler::new(broker.clone(), alert_store.clone(), 10_000);
        let h_raw = broker.consume(ALERT_RAW, 10, Arc::new(normalizer)).await.unwrap();

        let context_collector = ContextCollectorHandler::new(
            broker.clone(),
            alert_store.clone(),
            Arc::new(HeuristicNetworkResolver),
            Arc::new(MockAssetResolver),
            Arc::new(MockUserResolver),
            Duration::from_secs(3600),
        );
        let normalized_counter = CountingHandler::new(context_collector);
        let normalized_deliveries = normalized_counter.count.clone();
        let h_normalized = broker.consume(ALERT_NORMALIZED, 10, Arc::new(normalized_counter)).await.unwrap();

        let registry = ProviderRegistry::new(
            vec![Arc::new(MockThreatIntelProvider::new("osint", opts.known_malicious))],
            4,
            Duration::from_secs(1),
            Duration::from_secs(86_400),
        );
        let threat_intel = ThreatIntelHandler::new(broker.clone(), alert_store.clone(), registry);
        let enriched_capture = CapturingHandler::new(threat_intel);
        let enriched_captures = enriched_capture.captured.clone();
        let h_enriched = broker.consume(ALERT_ENRICHED, 10, Arc::new(enriched_capture)).await.unwrap();

        let catalog = ModelCatalog::new(vec![ModelSpec {
            model_id: "triage-primary".to_string(),
            capability: ModelCapability {
                context_window: 8192,
                strengths: vec!["triage".to_string()],
                cost_tier: CostTier::Low,
                max_complexity: 100,
            },
        }]);
        let client = Arc::new(ScriptedModelClient::new(opts.model_responses));
        let router = Arc::new(LlmRouter::new(
            catalog,
            RouterHealth::new(Duration::from_secs(60), 0.5, 10),
            client,
            1,
            Duration::from_millis(1),
        ));
        let similarity_index = Arc::new(SimilarityIndex::new(
            Box::new(HashingEmbedder::new(128)),
            Box::new(InMemoryVectorStore::new()),
        ));
        let ai_triage = AiTriageAgentHandler::new(
            broker.clone(),
            alert_store.clone(),
            triage_store.clone(),
            router,
            similarity_index,
            5,
            0.75,
            None,
        );
        let contextualized_capture = CapturingHandler::new(ai_triage);
        let contextualized_captures = contextualized_capture.captured.clone();
        let h_contextualized = broker.consume(ALERT_CONTEXTUALIZED, 10, Arc::new(contextualized_capture)).await.unwrap();

        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = SinkHandler { received: results.clone() };
        let h_result = broker.consume(ALERT_RESULT, 10, Arc::new(sink)).await.unwrap();

        Self {
            broker,
            alert_store,
            triage_store,
            normalized_deliveries,
            enriched_captures,
            contextualized_captures,
            results,
            _handles: vec![h_raw, h_normalized, h_enriched, h_contextualized, h_result],
        }
    }

    /// The `alert.enriched` envelopes threat-intel received, most recent
    /// last. Gives tests a window into `EnrichedContext` without a second
    /// consumer competing for the queue.
    pub async fn enriched_envelopes(&self) -> Vec<Value> {
        self.enriched_captures.lock().await.clone()
    }

    /// The `alert.contextualized` envelopes the AI Triage Agent received,
    /// carrying the aggregated threat-intel findings and score.
    pub async fn contextualized_envelopes(&self) -> Vec<Value> {
        self.contextualized_captures.lock().await.clone()
    }

    /// Mirrors the ingestion gate's own validate-then-persist-then-publish
    /// sequence (§4.2), without the HTTP layer, for scenarios that only
    /// care about what happens once an alert is on `alert.raw`.
    pub async fn submit(&self, submitted: Alert) -> Result<(), String> {
        alert::validate(&submitted, chrono::Duration::seconds(300)).map_err(|e| e.to_string())?;
        self.alert_store
            .insert_new(submitted.clone())
            .await
            .map_err(|e| e.to_string())?;
        let alert_id = submitted.alert_id.clone();
        let envelope = Envelope::new(submitted, alert_id, "ingestion-gate");
        let payload = serde_json::to_value(&envelope).map_err(|e| e.to_string())?;
        self.broker.publish(ALERT_RAW, payload).await.map_err(|e| e.to_string())
    }

    /// An `AppState` for `alertmesh_ingestion_gate::build_router` sharing
    /// this pipeline's broker and alert store, so alerts accepted over
    /// HTTP flow through the same stage handlers.
    pub fn gate_state(&self, requests_per_minute: u32) -> AppState {
        AppState {
            broker: self.broker.clone(),
            alert_store: self.alert_store.clone(),
            rate_limiter: Arc::new(RateLimiter::new(requests_per_minute)),
            metrics: Arc::new(GateMetrics::new()),
            clock_skew: chrono::Duration::seconds(300),
            batch_limit: 100,
        }
    }

    pub async fn results(&self) -> Vec<Value> {
        self.results.lock().await.clone()
    }

    /// Polls `check` until it returns `true` or `timeout` elapses,
    /// sleeping `step` between attempts. Every scenario here is driven
    /// through async broker queues, so assertions on store state need to
    /// wait for the consumer chain to catch up rather than racing it.
    pub async fn wait_until<F, Fut>(&self, timeout: Duration, step: Duration, check: F) -> bool
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if check().await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(step).await;
        }
    }
}
