//! A scriptable `ModelClient` used by tests and as the default client for
//! deployments with no real model endpoint configured yet.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::{ModelCallError, ModelClient, ModelResponse, ModelUsage};

pub struct ScriptedModelClient {
    responses: Vec<Result<String, ModelCallError>>,
    call_count: AtomicUsize,
}

impl ScriptedModelClient {
    pub fn new(responses: Vec<Result<String, ModelCallError>>) -> Self {
        Self {
            responses,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn calls_made(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn call(&self, _model_id: &str, _prompt: &str) -> Result<ModelResponse, ModelCallError> {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index).cloned() {
            Some(Ok(text)) => Ok(ModelResponse {
                text,
                usage: ModelUsage { prompt_tokens: 10, completion_tokens: 10 },
            }),
            Some(Err(err)) => Err(err),
            None => Err(ModelCallError::Fatal("scripted client exhausted".to_string())),
        }
    }
}
