//! Axum route handler for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::orchestrator::{GeneratedLetter, GenerationRequest};
use crate::generation::prompts::DirectiveInput;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateLetterRequest {
    pub company_name: String,
    pub cv_text: String,
    /// The user's own Gemini key. Used for this request only, never stored or logged.
    pub api_key: String,
    pub language: Option<String>,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateLetterResponse {
    pub text: String,
    pub model: String,
    pub attempts: usize,
}

impl From<GeneratedLetter> for GenerateLetterResponse {
    fn from(letter: GeneratedLetter) -> Self {
        Self {
            text: letter.text,
            model: letter.model,
            attempts: letter.attempts,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Builds the directive from the extracted CV text and runs the candidate
/// fallback chain. The response carries the letter and which model wrote it.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateLetterRequest>,
) -> Result<Json<GenerateLetterResponse>, AppError> {
    validate(&request)?;

    let submission_id = Uuid::new_v4();
    let today = chrono::Local::now().format("%B %-d, %Y").to_string();
    let input = DirectiveInput {
        company_name: &request.company_name,
        cv_text: &request.cv_text,
        language: request.language.as_deref(),
        custom_prompt: request.custom_prompt.as_deref(),
        today: &today,
    };
    let generation = GenerationRequest::new(
        &input,
        request.api_key.trim(),
        state.config.candidate_models.clone(),
    );

    info!(
        "Submission {submission_id}: generating letter for '{}' ({} chars of CV text)",
        request.company_name.trim(),
        request.cv_text.len()
    );
    let letter = state.orchestrator.generate(&generation).await?;
    info!("Submission {submission_id}: letter ready from {}", letter.model);

    Ok(Json(letter.into()))
}

fn validate(request: &GenerateLetterRequest) -> Result<(), AppError> {
    if request.company_name.trim().is_empty() {
        return Err(AppError::Validation("company_name cannot be empty".to_string()));
    }
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text cannot be empty".to_string()));
    }
    if request.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }
    Ok(())
}
