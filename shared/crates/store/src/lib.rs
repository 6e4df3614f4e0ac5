//! Alertmesh Store
//!
//! The persistence layer proper lives outside this repository (spec §1
//! treats it as an external collaborator). What lives here is the contract
//! every stage codes against — `AlertStore`, `TriageStore`, the TTL caches
//! used by the Context Collector and Threat-Intel Aggregator, and the
//! outbox used for message-id idempotency — plus an in-memory
//! implementation of each, sufficient for unit tests, integration tests,
//! and single-box deployments.

pub mod alert_store;
pub mod context_cache;
pub mod error;
pub mod outbox;
pub mod triage_store;
pub mod ttl_cache;

pub use alert_store::{AlertStore, InMemoryAlertStore};
pub use context_cache::{EnrichedContext, NetworkContext, UserContext};
pub use context_cache::AssetContext;
pub use error::StoreError;
pub use outbox::{InMemoryOutbox, Outbox};
pub use triage_store::{InMemoryTriageStore, RecommendedAction, RiskLevel, TriageResult, TriageStore};
pub use ttl_cache::TtlCache;
