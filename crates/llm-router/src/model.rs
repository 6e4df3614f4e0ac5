//! Model catalog entries: capability set and cost tier per §4.6.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCapability {
    pub context_window: u32,
    pub strengths: Vec<String>,
    pub cost_tier: CostTier,
    /// The highest complexity score (§4.6 "a bounded integer derived from
    /// alert fields") this model is rated to handle well.
    pub max_complexity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model_id: String,
    pub capability: ModelCapability,
}

impl ModelSpec {
    pub fn covers(&self, task_type: &str, complexity: u8) -> bool {
        self.capability.max_complexity >= complexity
            && (self.capability.strengths.iter().any(|s| s == task_type) || self.capability.strengths.iter().any(|s| s == "general"))
    }
}
