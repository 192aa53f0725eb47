//! Axum route handler for CV text extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::{extract_text, SourceDocument};
use crate::state::AppState;
use crate::upload::read_file_field;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub page_count: usize,
}

/// POST /api/v1/extract
///
/// Multipart body with a single `cv` file field (PDF only).
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut cv = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("cv") {
            cv = Some(read_file_field(field, state.config.max_upload_bytes).await?);
        }
    }

    let cv = cv.ok_or_else(|| AppError::Validation("cv file is required".to_string()))?;
    if !cv.is_pdf() {
        return Err(AppError::Validation("Please upload a PDF file".to_string()));
    }

    let document = tokio::task::spawn_blocking(move || SourceDocument::decode(&cv.bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extract task failed: {e}")))??;

    let text = extract_text(&document);
    info!(
        "Extracted {} chars from {} page(s)",
        text.len(),
        document.page_count()
    );

    Ok(Json(ExtractResponse {
        text,
        page_count: document.page_count(),
    }))
}
