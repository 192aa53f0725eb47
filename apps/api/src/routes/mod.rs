pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::bundle::handlers::handle_bundle;
use crate::extract::handlers::handle_extract;
use crate::generation::handlers::handle_generate;
use crate::state::AppState;

/// Room for a letter plus a handful of attachments at the per-file limit.
const BODY_LIMIT_FILES: usize = 8;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes.saturating_mul(BODY_LIMIT_FILES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/extract", post(handle_extract))
        .route("/api/v1/generate", post(handle_generate))
        .route("/api/v1/bundle", post(handle_bundle))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
