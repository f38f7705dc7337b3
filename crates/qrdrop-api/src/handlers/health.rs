use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Liveness check. Reports the configured backend without contacting it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "storage": state.storage.backend_type().to_string(),
        })),
    )
}
