//! Rule-based fallback (§4.7 step 3): "emit a rule-based fallback result
//! with level derived from (severity, aggregated threat score) and
//! `fallback=true`" once the LLM retry budget is exhausted.

use alertmesh_store::{RecommendedAction, RiskLevel, TriageResult};
use alertmesh_threat_intel::handler::ContextualizedAlert;

pub fn build(alert: &ContextualizedAlert, reason: &str, retry_count: u32) -> TriageResult {
    let core = &alert.enriched.normalized.alert;
    let level = RiskLevel::from_severity_and_score(core.severity, alert.threat_score);
    let recommended_actions = default_actions(level);

    TriageResult {
        alert_id: core.alert_id.clone(),
        score: alert.threat_score,
        level,
        confidence: 0.3,
        recommended_actions,
        narrative: format!(
            "Automated fallback triage: the triage model was unavailable ({reason}). Level derived from severity {:?} and aggregated threat score {}.",
            core.severity, alert.threat_score
        ),
        model_used: "rule-based-fallback".to_string(),
        latency_ms: 0,
        retry_count,
        fallback: true,
    }
}

fn default_actions(level: RiskLevel) -> Vec<RecommendedAction> {
    match level {
        RiskLevel::Critical | RiskLevel::High => vec![RecommendedAction {
            action: "escalate_to_on_call".to_string(),
            priority: "high".to_string(),
            rationale: "fallback triage flagged an elevated risk level".to_string(),
        }],
        RiskLevel::Medium => vec![RecommendedAction {
            action: "queue_for_analyst_review".to_string(),
            priority: "medium".to_string(),
            rationale: "fallback triage could not confirm a benign verdict".to_string(),
        }],
        RiskLevel::Low | RiskLevel::Info => vec![RecommendedAction {
            action: "monitor".to_string(),
            priority: "low".to_string(),
            rationale: "fallback triage found no strong indicators".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertmesh_context_collector::EnrichedAlert;
    use alertmesh_kernel::{Alert, AlertStatus, AlertType, Severity};
    use alertmesh_normalizer::ioc::IocSet;
    use alertmesh_normalizer::NormalizedAlert;
    use alertmesh_store::EnrichedContext;
    use std::collections::HashMap;

    fn sample(severity: Severity, threat_score: u8) -> ContextualizedAlert {
        ContextualizedAlert {
            enriched: EnrichedAlert {
                normalized: NormalizedAlert {
                    alert: Alert {
                        alert_id: "ALT-1".into(),
                        received_at: alertmesh_kernel::time::now_utc(),
                        event_timestamp: alertmesh_kernel::time::now_utc(),
                        alert_type: AlertType::Malware,
                        severity,
                        title: None,
                        description: None,
                        source_ip: None,
                        destination_ip: None,
                        file_hash: None,
                        url: None,
                        domain: None,
                        asset_id: None,
                        user_name: None,
                        status: AlertStatus::Enriched,
                        alert_metadata: HashMap::new(),
                    },
                    iocs: IocSet::default(),
                    fingerprint: "f".into(),
                },
                context: EnrichedContext::default(),
            },
            findings: vec![],
            threat_score,
        }
    }

    #[test]
    fn fallback_is_flagged_and_level_consistent() {
        let result = build(&sample(Severity::Critical, 20), "router unavailable", 3);
        assert!(result.fallback);
        assert!(result.is_level_consistent());
        assert_eq!(result.level, RiskLevel::Critical);
    }

    #[test]
    fn low_severity_low_score_yields_low_level() {
        let result = build(&sample(Severity::Low, 5), "router unavailable", 3);
        assert_eq!(result.level, RiskLevel::Low);
    }
}
