//! Static/configuration-driven model registry (§4.6).

use crate::model::{CostTier, ModelSpec};

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.model_id == model_id)
    }

    /// Every model whose capability set covers `task_type`/`complexity`,
    /// ranked cheapest-first-among-capable so the router prefers the
    /// least expensive model that can still do the job.
    pub fn candidates_for(&self, task_type: &str, complexity: u8) -> Vec<&ModelSpec> {
        let mut candidates: Vec<&ModelSpec> = self
            .models
            .iter()
            .filter(|m| m.covers(task_type, complexity))
            .collect();
        candidates.sort_by_key(|m| rank(m.capability.cost_tier));
        candidates
    }
}

fn rank(tier: CostTier) -> u8 {
    match tier {
        CostTier::Low => 0,
        CostTier::Medium => 1,
        CostTier::High => 2,
    }
}
