//! HTTP handlers (§4.2, §6).

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{instrument, warn};

use alertmesh_kernel::queues::ALERT_RAW;
use alertmesh_kernel::{alert::validate, time::now_utc, Envelope};

use crate::dto::{
    AlertStatusResponse, AlertSubmission, BatchResult, BatchSubmission, HealthChecks, HealthResponse, IngestAccepted, IngestError,
    IngestItemResult,
};
use crate::state::AppState;

const MAX_BATCH_ITEMS: usize = 100;

fn rate_limit_response(retry_after: std::time::Duration) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string()) {
        headers.insert("retry-after", value);
    }
    (StatusCode::TOO_MANY_REQUESTS, headers, "rate limit exceeded").into_response()
}

/// Persists the row and publishes to `alert.raw`; returns the accepted
/// receipt or the failure that should surface to the caller. Persistence
/// and publish are not transactional (§4.2): a publish failure leaves the
/// row in `new`, and a client retry with the same `alert_id` is
/// idempotent against `insert_new`'s uniqueness.
async fn ingest_one(state: &AppState, submission: AlertSubmission) -> Result<IngestAccepted, (StatusCode, String)> {
    let received_at = now_utc();
    let alert = submission.into_alert(received_at);
    let alert_id = alert.alert_id.clone();

    if let Err(err) = validate(&alert, state.clock_skew) {
        state.metrics.rejected_total.with_label_values(&["validation"]).inc();
        return Err((StatusCode::BAD_REQUEST, err.to_string()));
    }

    if let Err(err) = state.alert_store.insert_new(alert.clone()).await {
        state.metrics.rejected_total.with_label_values(&["persist"]).inc();
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    }

    let envelope = Envelope::new(alert, alert_id.clone(), "ingestion-gate");
    let payload = match serde_json::to_value(&envelope) {
        Ok(v) => v,
        Err(err) => return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string())),
    };

    if let Err(err) = state.broker.publish(ALERT_RAW, payload).await {
        state.metrics.rejected_total.with_label_values(&["publish"]).inc();
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    }

    state.metrics.accepted_total.inc();
    Ok(IngestAccepted {
        alert_id,
        status: alertmesh_kernel::AlertStatus::New,
        received_at,
    })
}

#[instrument(skip(state, headers, connect_info, body))]
pub async fn post_alert(
    State(state): State<AppState>,
    connect_info: ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let key = client_key(&connect_info, &headers);
    let decision = state.rate_limiter.check(&key);
    if !decision.allowed {
        state.metrics.rate_limited_total.inc();
        return rate_limit_response(decision.retry_after);
    }

    let submission: AlertSubmission = match serde_json::from_slice(&body) {
        Ok(s) => s,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("malformed alert payload: {err}")).into_response(),
    };

    match ingest_one(&state, submission).await {
        Ok(accepted) => (StatusCode::ACCEPTED, Json(accepted)).into_response(),
        Err((status, error)) => {
            warn!(%error, "ingestion rejected");
            (status, Json(IngestError { alert_id: None, error })).into_response()
        }
    }
}

#[instrument(skip(state, headers, connect_info, body))]
pub async fn post_alerts_batch(
    State(state): State<AppState>,
    connect_info: ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let key = client_key(&connect_info, &headers);
    let decision = state.rate_limiter.check(&key);
    if !decision.allowed {
        state.metrics.rate_limited_total.inc();
        return rate_limit_response(decision.retry_after);
    }

    let batch: BatchSubmission = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("malformed batch payload: {err}")).into_response(),
    };
    if batch.alerts.len() > MAX_BATCH_ITEMS {
        return (
            StatusCode::BAD_REQUEST,
            format!("batch exceeds the {MAX_BATCH_ITEMS}-item limit"),
        )
            .into_response();
    }

    let mut results = Vec::with_capacity(batch.alerts.len());
    for submission in batch.alerts {
        let alert_id = submission.alert_id.clone();
        let result = match ingest_one(&state, submission).await {
            Ok(accepted) => IngestItemResult::Accepted(accepted),
            Err((_, error)) => IngestItemResult::Rejected(IngestError {
                alert_id: Some(alert_id),
                error,
            }),
        };
        results.push(result);
    }

    (StatusCode::ACCEPTED, Json(BatchResult { results })).into_response()
}

#[instrument(skip(state))]
pub async fn get_alert(State(state): State<AppState>, Path(alert_id): Path<String>) -> Response {
    match state.alert_store.get(&alert_id).await {
        Ok(Some(alert)) => Json(AlertStatusResponse {
            alert_id: alert.alert_id,
            status: alert.status,
            received_at: alert.received_at,
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "alert not found").into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    let database = state.alert_store.get("__health_probe__").await.is_ok();
    let message_queue = true;
    Json(HealthResponse {
        status: if database && message_queue { "ok" } else { "degraded" },
        service: "ingestion-gate",
        checks: HealthChecks { database, message_queue },
    })
    .into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    (StatusCode::OK, state.metrics.render()).into_response()
}

fn client_key(connect_info: &ConnectInfo<SocketAddr>, headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .unwrap_or_else(|| connect_info.0.ip().to_string())
}
