//! S5: 120 submissions within a second from the same remote address
//! against the default 100/minute bucket should see at least 20 responses
//! rejected with 429, while every accepted alert still clears the whole
//! pipeline.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use alertmesh_ingestion_gate::build_router;
use alertmesh_kernel::AlertStatus;
use alertmesh_store::AlertStore;
use alertmesh_system_tests::{Pipeline, PipelineOptions};

const REQUEST_COUNT: usize = 120;
const RATE_LIMIT_PER_MINUTE: u32 = 100;

fn request(alert_id: &str) -> Request<Body> {
    let addr: SocketAddr = "203.0.113.7:6001".parse().unwrap();
    let body = serde_json::json!({
        "alert_id": alert_id,
        "alert_type": "anomaly",
        "severity": "low",
    });
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/v1/alerts")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burst_from_one_address_is_rate_limited_without_starving_accepted_alerts() {
    let pipeline = Pipeline::spawn(PipelineOptions {
        known_malicious: vec![],
        model_responses: std::iter::repeat_with(|| Ok(r#"{
            "score": 20, "level": "low", "confidence": 0.6,
            "recommended_actions": [{"action": "monitor", "priority": "low", "rationale": "low-severity anomaly"}],
            "narrative": "low-severity anomaly, no corroborating threat intel"
        }"#
        .to_string()))
        .take(REQUEST_COUNT)
        .collect(),
    })
    .await;
    let app = build_router(pipeline.gate_state(RATE_LIMIT_PER_MINUTE));

    let mut accepted_ids = Vec::new();
    let mut rejected_count = 0usize;
    for i in 0..REQUEST_COUNT {
        let alert_id = format!("ALT-BURST-{i}");
        let response = app.clone().oneshot(request(&alert_id)).await.unwrap();
        match response.status() {
            StatusCode::ACCEPTED => accepted_ids.push(alert_id),
            StatusCode::TOO_MANY_REQUESTS => rejected_count += 1,
            other => panic!("unexpected status {other} for request {i}"),
        }
    }

    assert!(
        rejected_count >= 20,
        "expected at least 20 of {REQUEST_COUNT} requests to be rate limited, got {rejected_count}"
    );
    assert_eq!(accepted_ids.len() + rejected_count, REQUEST_COUNT);

    for alert_id in &accepted_ids {
        let cleared = pipeline
            .wait_until(Duration::from_secs(5), Duration::from_millis(20), || async {
                matches!(
                    pipeline.alert_store.get(alert_id).await.unwrap().map(|a| a.status),
                    Some(AlertStatus::Analyzed)
                )
            })
            .await;
        assert!(cleared, "accepted alert {alert_id} did not clear the pipeline");
    }
}
