//! The boundary between the router and an actual model provider. The
//! router only knows `ModelClient`; provider-specific wire formats live
//! behind an implementation of this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
    pub usage: ModelUsage,
}

#[derive(Debug, Error, Clone)]
pub enum ModelCallError {
    #[error("transient model call failure: {0}")]
    Transient(String),
    #[error("fatal model call failure: {0}")]
    Fatal(String),
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn call(&self, model_id: &str, prompt: &str) -> Result<ModelResponse, ModelCallError>;
}
