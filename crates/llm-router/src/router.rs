//! `LlmRouter`: model selection, health-aware fallback, retry with
//! exponential backoff (§4.6). The router neither parses payloads nor
//! caches responses; that is the caller's concern.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::catalog::ModelCatalog;
use crate::client::{ModelCallError, ModelClient, ModelResponse, ModelUsage};
use crate::error::RouterError;
use crate::health::RouterHealth;

#[derive(Debug, Clone)]
pub struct Task {
    pub task_type: String,
    pub complexity: u8,
    pub pinned_model: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub model_id: String,
    pub response: ModelResponse,
    pub usage: ModelUsage,
    pub latency: Duration,
    pub retries: u32,
}

pub struct LlmRouter {
    catalog: ModelCatalog,
    health: RouterHealth,
    client: Arc<dyn ModelClient>,
    max_retries: u32,
    retry_backoff_base: Duration,
}

impl LlmRouter {
    pub fn new(
        catalog: ModelCatalog,
        health: RouterHealth,
        client: Arc<dyn ModelClient>,
        max_retries: u32,
        retry_backoff_base: Duration,
    ) -> Self {
        Self {
            catalog,
            health,
            client,
            max_retries,
            retry_backoff_base,
        }
    }

    pub async fn route(&self, task: &Task) -> Result<RouteOutcome, RouterError> {
        let candidates = self.candidate_models(task);
        if candidates.is_empty() {
            return Err(RouterError::RouterUnavailable);
        }

        for model_id in candidates {
            match self.call_with_retry(&model_id, &task.prompt).await {
                Ok((response, retries, latency)) => {
                    self.health.record_success(&model_id);
                    return Ok(RouteOutcome {
                        model_id,
                        usage: response.usage.clone(),
                        response,
                        latency,
                        retries,
                    });
                }
                Err(_) => {
                    self.health.record_failure(&model_id);
                    warn!(model_id = %model_id, "model exhausted retry budget, falling back");
                }
            }
        }

        Err(RouterError::RouterUnavailable)
    }

    /// Rule 1: a healthy pinned model is used directly. Rule 2: otherwise
    /// every healthy model whose capability covers the task, ranked
    /// cheapest-first.
    fn candidate_models(&self, task: &Task) -> Vec<String> {
        if let Some(pinned) = &task.pinned_model {
            if self.health.is_healthy(pinned) && self.catalog.get(pinned).is_some() {
                return vec![pinned.clone()];
            }
        }
        self.catalog
            .candidates_for(&task.task_type, task.complexity)
            .into_iter()
            .filter(|m| self.health.is_healthy(&m.model_id))
            .map(|m| m.model_id.clone())
            .collect()
    }

    /// Rule 3: transient failures retry the same model up to `max_retries`
    /// times with exponential backoff. A fatal failure stops retrying
    /// immediately (rule 4 then marks the model unhealthy and the caller
    /// falls back to the next candidate).
    async fn call_with_retry(&self, model_id: &str, prompt: &str) -> Result<(ModelResponse, u32, Duration), ModelCallError> {
        let started = Instant::now();
        let mut attempt = 0;
        loop {
            match self.client.call(model_id, prompt).await {
                Ok(response) => return Ok((response, attempt, started.elapsed())),
                Err(ModelCallError::Fatal(reason)) => {
                    debug!(model_id, %reason, "fatal model call failure");
                    return Err(ModelCallError::Fatal(reason));
                }
                Err(ModelCallError::Transient(reason)) if attempt < self.max_retries => {
                    debug!(model_id, %reason, attempt, "transient model call failure, retrying");
                    tokio::time::sleep(self.retry_backoff_base * 2u32.pow(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
