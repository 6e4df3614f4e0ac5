//! Alertmesh Threat-Intel Aggregator: bounded-concurrency provider fan-out,
//! per-(provider, ioc) caching, worst-verdict/mean-score aggregation.
//! Consumes `alert.enriched`, publishes `alert.contextualized`.

pub mod aggregate;
pub mod handler;
pub mod mock_provider;
pub mod provider;
pub mod registry;

pub use handler::{ContextualizedAlert, ThreatIntelHandler};
pub use provider::{Finding, ProviderError, ThreatIntelProvider, Verdict};
pub use registry::ProviderRegistry;
