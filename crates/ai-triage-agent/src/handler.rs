//! Wires the LLM router and similarity index into a
//! `alertmesh_broker::Handler` consuming `alert.contextualized` and
//! publishing `alert.result` (§4.7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{instrument, warn};

use alertmesh_broker::{Broker, Handler};
use alertmesh_kernel::queues::ALERT_RESULT;
use alertmesh_kernel::{AlertStatus, Envelope, Outcome};
use alertmesh_llm_router::{LlmRouter, Task};
use alertmesh_similarity_index::SimilarityIndex;
use alertmesh_store::{AlertStore, TriageResult, TriageStore};
use alertmesh_threat_intel::handler::ContextualizedAlert;

use crate::fallback;
use crate::output::{self, ParseError};
use crate::prompt;

/// §4.7 step 3: "nack-to-retry up to 3 attempts with exponential backoff
/// (1s, 2s, 4s)". These are attempts at the whole route-and-parse
/// operation, distinct from `LlmRouter`'s own per-model call retries.
const MAX_ATTEMPTS: u32 = 3;

fn backoff_for(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(2))
}

pub struct AiTriageAgentHandler {
    broker: Arc<dyn Broker>,
    alert_store: Arc<dyn AlertStore>,
    triage_store: Arc<dyn TriageStore>,
    router: Arc<LlmRouter>,
    similarity_index: Arc<SimilarityIndex>,
    similarity_top_k: usize,
    similarity_threshold: f32,
    default_model: Option<String>,
}

impl AiTriageAgentHandler {
    pub fn new(
        broker: Arc<dyn Broker>,
        alert_store: Arc<dyn AlertStore>,
        triage_store: Arc<dyn TriageStore>,
        router: Arc<LlmRouter>,
        similarity_index: Arc<SimilarityIndex>,
        similarity_top_k: usize,
        similarity_threshold: f32,
        default_model: Option<String>,
    ) -> Self {
        Self {
            broker,
            alert_store,
            triage_store,
            router,
            similarity_index,
            similarity_top_k,
            similarity_threshold,
            default_model,
        }
    }

    fn search_text(alert: &ContextualizedAlert) -> String {
        let core = &alert.enriched.normalized.alert;
        format!("{} {}", core.title.as_deref().unwrap_or(""), core.description.as_deref().unwrap_or(""))
    }

    /// One attempt: compose the prompt, route to a model, parse the
    /// response, attempting a single repair prompt on a parse failure.
    /// Returns `Ok` only on a structurally valid, level-consistent result.
    async fn attempt(&self, task: &Task, alert: &ContextualizedAlert) -> Result<(output::ModelOutput, String, u32, u64), String> {
        let route = self.router.route(task).await.map_err(|e| e.to_string())?;
        match output::parse(&route.response.text) {
            Ok(parsed) => Ok((parsed, route.model_id, route.retries, route.latency.as_millis() as u64)),
            Err(err) => {
                let repair = prompt::repair_prompt(&route.response.text, &err.to_string());
                let repair_task = Task {
                    prompt: repair,
                    ..task.clone()
                };
                let route = self.router.route(&repair_task).await.map_err(|e| e.to_string())?;
                output::parse(&route.response.text)
                    .map(|parsed| (parsed, route.model_id, route.retries, route.latency.as_millis() as u64))
                    .map_err(|repaired_err| repaired_err_message(&err, &repaired_err))
            }
        }
    }
}

fn repaired_err_message(first: &ParseError, second: &ParseError) -> String {
    format!("still invalid after repair prompt: first={first}, second={second}")
}

#[async_trait]
impl Handler for AiTriageAgentHandler {
    #[instrument(skip(self, envelope))]
    async fn handle(&self, envelope: Value) -> Outcome {
        let parsed: Result<Envelope<ContextualizedAlert>, _> = serde_json::from_value(envelope);
        let envelope = match parsed {
            Ok(e) => e,
            Err(err) => return Outcome::fatal(format!("unparseable contextualized payload: {err}")),
        };
        let alert = envelope.data;
        let alert_id = alert.enriched.normalized.alert.alert_id.clone();
        let core = &alert.enriched.normalized.alert;

        let similar = self
            .similarity_index
            .search(&Self::search_text(&alert), self.similarity_top_k, self.similarity_threshold, None)
            .await;

        let complexity = alertmesh_llm_router::complexity::score(
            alert.findings.len(),
            core.severity,
            core.description.as_deref().map(str::len).unwrap_or(0),
        );
        let task = Task {
            task_type: "triage".to_string(),
            complexity,
            pinned_model: self.default_model.clone(),
            prompt: prompt::compose(&alert, &similar),
        };

        let mut last_error = String::new();
        let mut result = None;
        for attempt_number in 0..MAX_ATTEMPTS {
            match self.attempt(&task, &alert).await {
                Ok((parsed, model_used, retries, latency_ms)) => {
                    let mut triage = TriageResult {
                        alert_id: alert_id.clone(),
                        score: parsed.score,
                        level: parsed.level,
                        confidence: parsed.confidence,
                        recommended_actions: parsed.recommended_actions,
                        narrative: parsed.narrative,
                        model_used,
                        latency_ms,
                        retry_count: retries,
                        fallback: false,
                    };
                    // Clamp: the model may not report a level below the
                    // score-derived floor (§4.7, "Level assignment").
                    if !triage.is_level_consistent() {
                        triage.level = alertmesh_store::RiskLevel::from_score(triage.score);
                    }
                    result = Some(triage);
                    break;
                }
                Err(err) => {
                    last_error = err;
                    if attempt_number + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_for(attempt_number)).await;
                    }
                }
            }
        }

        let triage = result.unwrap_or_else(|| fallback::build(&alert, &last_error, MAX_ATTEMPTS));
        let degraded = triage.fallback;

        if let Err(err) = self.triage_store.upsert(triage.clone()).await {
            warn!(%alert_id, %err, "triage store unavailable");
            return Outcome::retryable(format!("triage store unavailable: {err}"));
        }
        if let Err(err) = self.alert_store.advance_status(&alert_id, AlertStatus::Analyzed).await {
            warn!(%alert_id, %err, "status advance failed");
            return Outcome::retryable(format!("store unavailable: {err}"));
        }

        let mut metadata = HashMap::new();
        metadata.insert("alert_type".to_string(), serde_json::json!(format!("{:?}", core.alert_type).to_lowercase()));
        metadata.insert("indexed_at".to_string(), serde_json::json!(alertmesh_kernel::time::now_utc().to_rfc3339()));
        self.similarity_index.index(&alert_id, &Self::search_text(&alert), metadata).await;

        let outgoing = Envelope::new(triage, alert_id.clone(), "ai-triage-agent");
        let outgoing = match serde_json::to_value(&outgoing) {
            Ok(v) => v,
            Err(err) => return Outcome::fatal(format!("could not serialize triage result: {err}")),
        };

        match self.broker.publish(ALERT_RESULT, outgoing).await {
            Ok(()) if degraded => Outcome::degraded(last_error),
            Ok(()) => Outcome::Ok,
            Err(err) => Outcome::retryable(format!("publish failed: {err}")),
        }
    }
}
