//! `ThreatIntelProvider`: the capability interface behind which every
//! concrete threat-intel source (commercial feed, open-source feed, mock)
//! plugs in, per §9's "polymorphism over threat-intel providers ...
//! adding a provider is a registration, not a code-path edit".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Unknown,
    Clean,
    Suspicious,
    Malicious,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub provider: String,
    pub ioc: String,
    pub verdict: Verdict,
    pub score: u8,
    pub evidence: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("provider call timed out")]
    Timeout,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

impl ProviderError {
    /// Per the open question in §9 ("the exact set of failure codes ...
    /// transient vs fatal"), this is resolved in DESIGN.md: `Timeout` and
    /// `Unavailable` are transient at the provider level but never
    /// propagate as a stage-level retry — §4.5 mandates that a provider
    /// failure yields `unknown` for that (provider, IOC) pair and the
    /// stage proceeds regardless. `Rejected` (a well-formed 4xx-shaped
    /// refusal) is the one outcome a caller might reasonably treat as
    /// worth logging distinctly, so it is kept as its own variant.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Timeout | ProviderError::Unavailable(_))
    }
}

#[async_trait]
pub trait ThreatIntelProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, ioc: &str) -> Result<Finding, ProviderError>;
}
