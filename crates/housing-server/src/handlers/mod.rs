//! HTTP route handlers for the prediction API.

pub mod predict;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// GET /health - 200 when both artifacts are loaded, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    if state.model_loaded() {
        (StatusCode::OK, Json(HealthResponse { status: "healthy", model_loaded: true }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "unhealthy", model_loaded: false }),
        )
    }
}
