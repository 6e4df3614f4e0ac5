//! S1: a malware alert carrying a known-malicious hash against a
//! production (high-criticality) asset should clear the whole pipeline
//! into a high-or-critical triage with at least one immediate action, and
//! the enrichment should report the alert as external when no source IP
//! was supplied.

use std::time::Duration;

use alertmesh_kernel::{AlertStatus, AlertType, Severity};
use alertmesh_store::{AlertStore, RiskLevel, TriageStore};
use alertmesh_system_tests::{base_alert, Pipeline, PipelineOptions};

const KNOWN_BAD_HASH: &str = "5d41402abc4b2a76b9719d911017c592";

#[tokio::test]
async fn malicious_hash_on_critical_asset_reaches_high_or_critical_triage() {
    let pipeline = Pipeline::spawn(PipelineOptions {
        known_malicious: vec![KNOWN_BAD_HASH.to_string()],
        ..Default::default()
    })
    .await;

    let mut alert = base_alert("ALT-001", AlertType::Malware, Severity::High);
    alert.file_hash = Some(KNOWN_BAD_HASH.to_string());
    alert.asset_id = Some("SRV-PROD-001".to_string());
    alert.description = Some(format!("endpoint agent flagged file hash {KNOWN_BAD_HASH} as ransomware"));

    pipeline.submit(alert).await.expect("S1 payload is well-formed");

    let reached_analyzed = pipeline
        .wait_until(Duration::from_secs(2), Duration::from_millis(10), || async {
            matches!(
                pipeline.alert_store.get("ALT-001").await.unwrap().map(|a| a.status),
                Some(AlertStatus::Analyzed)
            )
        })
        .await;
    assert!(reached_analyzed, "alert did not reach Analyzed status in time");

    let triage = pipeline.triage_store.get("ALT-001").await.unwrap().expect("triage result is persisted");
    assert!(
        matches!(triage.level, RiskLevel::High | RiskLevel::Critical),
        "expected high or critical, got {:?}",
        triage.level
    );
    assert!(
        triage
            .recommended_actions
            .iter()
            .any(|a| a.priority.eq_ignore_ascii_case("immediate")),
        "expected at least one immediate-priority action, got {:?}",
        triage.recommended_actions
    );

    let results = pipeline.results().await;
    assert_eq!(results.len(), 1, "expected exactly one alert.result publish");

    let enriched = pipeline.enriched_envelopes().await;
    assert_eq!(enriched.len(), 1);
    let is_internal = enriched[0]["data"]["context"]["network"]["is_internal"].as_bool();
    assert_eq!(
        is_internal,
        Some(false),
        "no source_ip was supplied, network context should default to external"
    );
}
