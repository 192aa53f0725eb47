//! Axum route handler for bundle downloads.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use crate::bundle::{compose_bundle, AttachmentFile, SkippedAttachment};
use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::read_file_field;

pub const BUNDLE_DISPOSITION: &str = "attachment; filename=\"job_application_bundle.pdf\"";

/// Comma-separated names of attachments that contributed no pages.
pub const SKIPPED_HEADER: HeaderName = HeaderName::from_static("x-bundle-skipped-attachments");

/// POST /api/v1/bundle
///
/// Multipart body: one `letter` text field, then any number of
/// `attachments` file fields. Attachments are merged in the order received.
pub async fn handle_bundle(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let limit = state.config.max_upload_bytes;
    let mut letter: Option<String> = None;
    let mut attachments: Vec<AttachmentFile> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("letter") => letter = Some(field.text().await?),
            Some("attachments") => {
                let file = read_file_field(field, limit).await?;
                // An empty file input still submits a nameless, empty part.
                if !file.bytes.is_empty() {
                    attachments.push(file.into());
                }
            }
            _ => {}
        }
    }

    let letter = letter
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::Validation("letter text is required".to_string()))?;

    let submission_id = Uuid::new_v4();
    info!(
        "Submission {submission_id}: composing bundle with {} attachment(s)",
        attachments.len()
    );

    let bundle = tokio::task::spawn_blocking(move || compose_bundle(&letter, attachments))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("bundle task failed: {e}")))??;

    info!(
        "Submission {submission_id}: bundle ready ({} pages, {} skipped)",
        bundle.page_count,
        bundle.skipped.len()
    );

    let mut response = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(BUNDLE_DISPOSITION),
            ),
        ],
        bundle.bytes,
    )
        .into_response();

    if let Some(value) = skipped_header_value(&bundle.skipped) {
        response.headers_mut().insert(SKIPPED_HEADER, value);
    }
    Ok(response)
}

/// Header values must be visible ASCII, so anything else in a file name is
/// replaced with `_`.
fn skipped_header_value(skipped: &[SkippedAttachment]) -> Option<HeaderValue> {
    if skipped.is_empty() {
        return None;
    }
    let joined = skipped
        .iter()
        .map(|s| {
            s.name
                .chars()
                .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
                .filter(|&c| c != ',')
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(",");
    HeaderValue::from_str(&joined).ok()
}
