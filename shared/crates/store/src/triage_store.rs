//! `TriageStore`: the 1:1 `triage_results` row per `alert_id` (§3).

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use alertmesh_kernel::Severity;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// The fixed thresholds from §3: level is a pure function of score.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=100 => RiskLevel::Critical,
            60..=79 => RiskLevel::High,
            40..=59 => RiskLevel::Medium,
            20..=39 => RiskLevel::Low,
            _ => RiskLevel::Info,
        }
    }

    pub fn from_severity_and_score(severity: Severity, score: u8) -> Self {
        let by_score = Self::from_score(score);
        let by_severity = match severity {
            Severity::Critical => RiskLevel::Critical,
            Severity::High => RiskLevel::High,
            Severity::Medium => RiskLevel::Medium,
            Severity::Low => RiskLevel::Low,
            Severity::Info => RiskLevel::Info,
        };
        by_score.max(by_severity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action: String,
    pub priority: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub alert_id: String,
    pub score: u8,
    pub level: RiskLevel,
    pub confidence: f32,
    pub recommended_actions: Vec<RecommendedAction>,
    pub narrative: String,
    pub model_used: String,
    pub latency_ms: u64,
    pub retry_count: u32,
    pub fallback: bool,
}

impl TriageResult {
    /// Testable property #3: `level` is consistent with `score`. The model
    /// may propose a level; this clamps it to the score-derived floor so an
    /// under-reported level can never survive (§4.7, "clamped by the
    /// score→level mapping").
    pub fn is_level_consistent(&self) -> bool {
        self.level >= RiskLevel::from_score(self.score)
    }
}

#[async_trait]
pub trait TriageStore: Send + Sync {
    /// Overwrites any prior result for `alert_id` (idempotent on replay,
    /// testable property #6).
    async fn upsert(&self, result: TriageResult) -> Result<(), StoreError>;

    async fn get(&self, alert_id: &str) -> Result<Option<TriageResult>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTriageStore {
    rows: DashMap<String, TriageResult>,
}

impl InMemoryTriageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TriageStore for InMemoryTriageStore {
    async fn upsert(&self, result: TriageResult) -> Result<(), StoreError> {
        self.rows.insert(result.alert_id.clone(), result);
        Ok(())
    }

    async fn get(&self, alert_id: &str) -> Result<Option<TriageResult>, StoreError> {
        Ok(self.rows.get(alert_id).map(|r| r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_thresholds_match_spec() {
        assert_eq!(RiskLevel::from_score(80), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Info);
    }

    #[test]
    fn clamp_rejects_underreported_level() {
        let result = TriageResult {
            alert_id: "ALT-1".into(),
            score: 90,
            level: RiskLevel::Low,
            confidence: 0.8,
            recommended_actions: vec![],
            narrative: String::new(),
            model_used: "test".into(),
            latency_ms: 0,
            retry_count: 0,
            fallback: false,
        };
        assert!(!result.is_level_consistent());
    }

    #[tokio::test]
    async fn upsert_overwrites_prior_result() {
        let store = InMemoryTriageStore::new();
        let mut result = TriageResult {
            alert_id: "ALT-1".into(),
            score: 10,
            level: RiskLevel::Info,
            confidence: 0.5,
            recommended_actions: vec![],
            narrative: "first".into(),
            model_used: "m1".into(),
            latency_ms: 5,
            retry_count: 0,
            fallback: false,
        };
        store.upsert(result.clone()).await.unwrap();
        result.narrative = "second".into();
        store.upsert(result).await.unwrap();

        let stored = store.get("ALT-1").await.unwrap().unwrap();
        assert_eq!(stored.narrative, "second");
    }
}
