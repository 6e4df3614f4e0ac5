//! Process and pipeline counters exposed in Prometheus exposition format
//! at `GET /metrics` (§6).

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct GateMetrics {
    registry: Registry,
    pub accepted_total: IntCounter,
    pub rejected_total: IntCounterVec,
    pub rate_limited_total: IntCounter,
}

impl GateMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let accepted_total = IntCounter::new("alertmesh_ingest_accepted_total", "Alerts accepted for ingestion").unwrap();
        let rejected_total = IntCounterVec::new(
            Opts::new("alertmesh_ingest_rejected_total", "Alerts rejected at ingestion"),
            &["reason"],
        )
        .unwrap();
        let rate_limited_total = IntCounter::new("alertmesh_ingest_rate_limited_total", "Requests rejected by the rate limiter").unwrap();

        registry.register(Box::new(accepted_total.clone())).unwrap();
        registry.register(Box::new(rejected_total.clone())).unwrap();
        registry.register(Box::new(rate_limited_total.clone())).unwrap();

        Self {
            registry,
            accepted_total,
            rejected_total,
            rate_limited_total,
        }
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).expect("prometheus encoding is infallible for well-formed metrics");
        String::from_utf8(buffer).expect("prometheus text encoding is always valid UTF-8")
    }
}

impl Default for GateMetrics {
    fn default() -> Self {
        Self::new()
    }
}
