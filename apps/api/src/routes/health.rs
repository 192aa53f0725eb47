use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Configured generation candidates, in fallback order.
    pub candidate_models: Vec<String>,
    pub max_upload_bytes: usize,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        candidate_models: state.config.candidate_models.clone(),
        max_upload_bytes: state.config.max_upload_bytes,
    })
}
