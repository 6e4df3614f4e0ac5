//! Alertmesh Context Collector: network/asset/user enrichment via pluggable
//! resolvers, each fronted by a TTL cache. Consumes `alert.normalized`,
//! publishes `alert.enriched`.

pub mod handler;
pub mod mock_resolvers;
pub mod network;
pub mod resolver;

pub use handler::{ContextCollectorHandler, EnrichedAlert};
pub use resolver::{AssetResolver, NetworkResolver, UserResolver};
