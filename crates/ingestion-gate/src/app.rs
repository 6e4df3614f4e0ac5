//! Router assembly: binds the handlers in `handlers.rs` to the paths in §6.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/alerts", post(handlers::post_alert))
        .route("/api/v1/alerts/batch", post(handlers::post_alerts_batch))
        .route("/api/v1/alerts/:alert_id", get(handlers::get_alert))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
