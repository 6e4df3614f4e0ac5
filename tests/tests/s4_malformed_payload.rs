//! S4: a payload missing required fields (here, `alert_type`, and a
//! `severity` string the canonical enum doesn't recognize) should be
//! rejected with 400, leave no row behind, and never reach the broker.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use alertmesh_ingestion_gate::build_router;
use alertmesh_store::AlertStore;
use alertmesh_system_tests::{Pipeline, PipelineOptions};

fn request(body: serde_json::Value) -> Request<Body> {
    let addr: SocketAddr = "127.0.0.1:5001".parse().unwrap();
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/v1/alerts")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn malformed_payload_is_rejected_without_side_effects() {
    let pipeline = Pipeline::spawn(PipelineOptions::default()).await;
    let app = build_router(pipeline.gate_state(100));

    let body = serde_json::json!({ "alert_id": "ALT-003", "severity": "urgent" });
    let response = app.oneshot(request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Give any (incorrectly) published message a moment to land before
    // asserting none did.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(
        pipeline.alert_store.get("ALT-003").await.unwrap().is_none(),
        "no row should have been inserted for a rejected submission"
    );
    assert!(pipeline.results().await.is_empty(), "no alert.result should have published");
    assert_eq!(pipeline.normalized_deliveries.load(std::sync::atomic::Ordering::SeqCst), 0);
}
