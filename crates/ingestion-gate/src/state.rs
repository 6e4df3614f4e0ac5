use std::sync::Arc;

use chrono::Duration as ChronoDuration;

use alertmesh_broker::Broker;
use alertmesh_store::AlertStore;

use crate::metrics::GateMetrics;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<dyn Broker>,
    pub alert_store: Arc<dyn AlertStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics: Arc<GateMetrics>,
    pub clock_skew: ChronoDuration,
    pub batch_limit: usize,
}
