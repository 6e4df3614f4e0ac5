//! S6: when the triage stage's model calls fail on every attempt (the
//! router exhausts its candidates), the handler should still persist a
//! `fallback=true` triage result with a level derived from severity and
//! threat score, and `alert.result` should still publish.

use std::time::Duration;

use alertmesh_kernel::{AlertStatus, AlertType, Severity};
use alertmesh_store::{AlertStore, RiskLevel, TriageStore};
use alertmesh_system_tests::{base_alert, Pipeline, PipelineOptions};

const KNOWN_BAD_HASH: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

#[tokio::test]
async fn persistent_model_failure_degrades_to_rule_based_fallback() {
    // An empty response script: every routed call immediately exhausts
    // the `ScriptedModelClient`'s scripted responses and returns the
    // router's "exhausted" fatal error, so every one of the handler's own
    // three attempts fails and it falls through to `fallback::build`.
    let pipeline = Pipeline::spawn(PipelineOptions {
        known_malicious: vec![KNOWN_BAD_HASH.to_string()],
        model_responses: vec![],
    })
    .await;

    let mut alert = base_alert("ALT-900", AlertType::Malware, Severity::High);
    alert.file_hash = Some(KNOWN_BAD_HASH.to_string());
    alert.description = Some(format!("agent reported hash {KNOWN_BAD_HASH}"));

    pipeline.submit(alert).await.expect("S6 payload is well-formed");

    let reached_analyzed = pipeline
        .wait_until(Duration::from_secs(10), Duration::from_millis(20), || async {
            matches!(
                pipeline.alert_store.get("ALT-900").await.unwrap().map(|a| a.status),
                Some(AlertStatus::Analyzed)
            )
        })
        .await;
    assert!(reached_analyzed, "alert should still reach Analyzed even on total model failure");

    let triage = pipeline.triage_store.get("ALT-900").await.unwrap().expect("a fallback triage result is persisted");
    assert!(triage.fallback, "triage result should be flagged as a rule-based fallback");
    assert_eq!(triage.model_used, "rule-based-fallback");
    assert!(triage.is_level_consistent());
    assert!(
        matches!(triage.level, RiskLevel::High | RiskLevel::Critical),
        "a known-malicious hash on a high-severity alert should still fall back to a high-or-critical level, got {:?}",
        triage.level
    );

    let results = pipeline.results().await;
    assert_eq!(results.len(), 1, "alert.result should still publish on a degraded outcome");
    assert_eq!(results[0]["data"]["fallback"].as_bool(), Some(true));
}
