//! S3: a brute-force alert between two RFC1918 addresses should be
//! enriched as internal-to-internal, the threat-intel mock feed should
//! report both addresses `unknown` (no public reputation data for private
//! ranges), and the resulting triage should stay at or below `high` with a
//! narrative that calls out the internal origin.

use std::time::Duration;

use alertmesh_kernel::{AlertStatus, AlertType, Severity};
use alertmesh_store::{AlertStore, RiskLevel, TriageStore};
use alertmesh_system_tests::{base_alert, Pipeline, PipelineOptions};

#[tokio::test]
async fn internal_brute_force_stays_bounded_and_is_flagged_internal() {
    let pipeline = Pipeline::spawn(PipelineOptions {
        known_malicious: vec![],
        model_responses: vec![Ok(r#"{
            "score": 45,
            "level": "medium",
            "confidence": 0.7,
            "recommended_actions": [{"action": "reset credentials", "priority": "high", "rationale": "repeated failed logins from an internal host"}],
            "narrative": "repeated authentication failures between two internal-origin hosts; likely internal brute force, not attributable to external threat infrastructure"
        }"#
        .to_string())],
    })
    .await;

    let mut alert = base_alert("ALT-002", AlertType::BruteForce, Severity::Medium);
    alert.source_ip = Some("10.0.0.5".to_string());
    alert.destination_ip = Some("10.0.0.20".to_string());
    alert.user_name = Some("jdoe".to_string());
    alert.description = Some("repeated failed logins from 10.0.0.5 against 10.0.0.20".to_string());

    pipeline.submit(alert).await.expect("S3 payload is well-formed");

    let reached_analyzed = pipeline
        .wait_until(Duration::from_secs(2), Duration::from_millis(10), || async {
            matches!(
                pipeline.alert_store.get("ALT-002").await.unwrap().map(|a| a.status),
                Some(AlertStatus::Analyzed)
            )
        })
        .await;
    assert!(reached_analyzed);

    let enriched = pipeline.enriched_envelopes().await;
    assert_eq!(enriched.len(), 1);
    assert_eq!(
        enriched[0]["data"]["context"]["network"]["is_internal"].as_bool(),
        Some(true),
        "source_ip 10.0.0.5 is RFC1918 and should be classified internal"
    );

    let contextualized = pipeline.contextualized_envelopes().await;
    assert_eq!(contextualized.len(), 1);
    let findings = contextualized[0]["data"]["findings"].as_array().cloned().unwrap_or_default();
    assert!(!findings.is_empty(), "both private IPs should have been looked up as IOCs");
    for finding in &findings {
        assert_eq!(finding["verdict"].as_str(), Some("unknown"), "private IPs have no public reputation data");
    }

    let results = pipeline.results().await;
    assert_eq!(results.len(), 1);

    let triage = pipeline.triage_store.get("ALT-002").await.unwrap().expect("triage result is persisted");
    assert!(
        triage.level <= RiskLevel::High,
        "internal brute force between two private hosts should not escalate past high, got {:?}",
        triage.level
    );
    assert!(
        triage.narrative.to_ascii_lowercase().contains("internal"),
        "narrative should call out internal origin: {}",
        triage.narrative
    );
}
