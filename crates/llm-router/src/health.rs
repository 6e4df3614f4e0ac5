//! Router health (§4.6, §9 glossary "Router health"): a rolling per-model
//! error signal observed from call outcomes, with a cooldown window once a
//! model is marked unhealthy. Process-local by design — §9's open
//! question on sharing health across router processes is resolved in
//! DESIGN.md in favor of keeping it local for this implementation.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct ModelHealth {
    successes: u32,
    failures: u32,
    unhealthy_until: Option<Instant>,
}

impl Default for ModelHealth {
    fn default() -> Self {
        Self {
            successes: 0,
            failures: 0,
            unhealthy_until: None,
        }
    }
}

pub struct RouterHealth {
    models: DashMap<String, ModelHealth>,
    cooldown: Duration,
    /// A model is marked unhealthy once its rolling error rate reaches
    /// this fraction, with a minimum sample size to avoid flapping on the
    /// first failed call.
    error_rate_threshold: f64,
    min_samples: u32,
}

impl RouterHealth {
    pub fn new(cooldown: Duration, error_rate_threshold: f64, min_samples: u32) -> Self {
        Self {
            models: DashMap::new(),
            cooldown,
            error_rate_threshold,
            min_samples,
        }
    }

    pub fn record_success(&self, model_id: &str) {
        let mut entry = self.models.entry(model_id.to_string()).or_default();
        entry.successes += 1;
    }

    /// Records a failure; if the rolling error rate crosses the threshold,
    /// starts (or extends) the model's cooldown window.
    pub fn record_failure(&self, model_id: &str) {
        let mut entry = self.models.entry(model_id.to_string()).or_default();
        entry.failures += 1;
        let total = entry.successes + entry.failures;
        if total >= self.min_samples {
            let error_rate = entry.failures as f64 / total as f64;
            if error_rate >= self.error_rate_threshold {
                entry.unhealthy_until = Some(Instant::now() + self.cooldown);
            }
        }
    }

    pub fn is_healthy(&self, model_id: &str) -> bool {
        match self.models.get(model_id) {
            Some(entry) => entry
                .unhealthy_until
                .map(|until| Instant::now() >= until)
                .unwrap_or(true),
            None => true,
        }
    }
}
