//! Health endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::services::{AppState, ServiceHealthStatus};

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ServiceHealthStatus>) {
    let status = state.health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        tracing::warn!(issues = ?status.get_issues(), "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
