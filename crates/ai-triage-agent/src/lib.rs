//! Alertmesh AI Triage Agent: per-alert-type prompt composition, LLM
//! Router and Similarity Index consultation, structured-output parsing
//! with a single repair attempt, and a rule-based fallback on exhausted
//! retries (§4.7). Consumes `alert.contextualized`, publishes
//! `alert.result`.

pub mod fallback;
pub mod handler;
pub mod output;
pub mod prompt;

pub use handler::AiTriageAgentHandler;
pub use output::{ModelOutput, ParseError};
