//! Alertmesh LLM Router: model catalog, complexity-based routing, health
//! tracking and retry/fallback (§4.6). A library consulted synchronously
//! by the AI Triage Agent, not a standalone broker-consuming stage.

pub mod catalog;
pub mod client;
pub mod complexity;
pub mod error;
pub mod health;
pub mod mock_client;
pub mod model;
pub mod router;

pub use catalog::ModelCatalog;
pub use client::{ModelCallError, ModelClient, ModelResponse, ModelUsage};
pub use error::RouterError;
pub use health::RouterHealth;
pub use model::{CostTier, ModelCapability, ModelSpec};
pub use router::{LlmRouter, RouteOutcome, Task};
