//! S2: submitting the same alert twice within a second should still
//! produce exactly one stored alert, one normalizer delivery, and one
//! triage result — the normalizer's fingerprint dedup window absorbs the
//! replay before it ever reaches the rest of the pipeline.

use std::sync::atomic::Ordering;
use std::time::Duration;

use alertmesh_kernel::{AlertStatus, AlertType, Severity};
use alertmesh_store::AlertStore;
use alertmesh_system_tests::{base_alert, Pipeline, PipelineOptions};

#[tokio::test]
async fn duplicate_submission_within_a_second_is_deduplicated() {
    let pipeline = Pipeline::spawn(PipelineOptions::default()).await;

    let mut alert = base_alert("ALT-001", AlertType::Malware, Severity::High);
    alert.file_hash = Some("5d41402abc4b2a76b9719d911017c592".to_string());
    alert.asset_id = Some("SRV-PROD-001".to_string());

    pipeline.submit(alert.clone()).await.expect("first submission is well-formed");
    pipeline.submit(alert).await.expect("second submission is well-formed (idempotent)");

    let reached_analyzed = pipeline
        .wait_until(Duration::from_secs(2), Duration::from_millis(10), || async {
            matches!(
                pipeline.alert_store.get("ALT-001").await.unwrap().map(|a| a.status),
                Some(AlertStatus::Analyzed)
            )
        })
        .await;
    assert!(reached_analyzed);

    // Give the (already-deduplicated) second delivery a chance to land if
    // it were ever going to, so the counters below aren't racing it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        pipeline.normalized_deliveries.load(Ordering::SeqCst),
        1,
        "exactly one alert.normalized delivery should have reached the context collector"
    );
    assert_eq!(pipeline.results().await.len(), 1, "exactly one alert.result should have published");

    let stored = pipeline.alert_store.get("ALT-001").await.unwrap();
    assert!(stored.is_some(), "one alert row should exist");
}
