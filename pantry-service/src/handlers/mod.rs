//! HTTP handlers for pantry-service.

pub mod bills;
pub mod drafts;
pub mod entries;
pub mod rates;
pub mod usage;

use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use serde_json::json;

/// Calendar date the time windows are evaluated against.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "pantry-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe: both sheets are readable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let entries = state.entries.health_check().await;
    let rates = state.rates.load().await.map(|_| ());

    match entries.and(rates) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "reason": e.to_string() })),
            )
        }
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
