//! Generation Orchestrator: ordered fallback across candidate models.
//!
//! Flow: for each candidate in order → one backend call → first non-empty
//! text wins. Errors, timeouts and empty payloads all count as a failure for
//! that candidate; only the last one is kept and surfaced when every
//! candidate fails. There is no retry within a candidate.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::generation::prompts::{build_directive, DirectiveInput};
use crate::generation::GenerationError;
use crate::llm_client::{GenerationBackend, LlmError};

/// One submission's generation inputs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Full instruction prompt, with the CV text already inlined.
    pub directive: String,
    pub credential: String,
    pub candidate_models: Vec<String>,
}

impl GenerationRequest {
    pub fn new(
        input: &DirectiveInput<'_>,
        credential: impl Into<String>,
        candidate_models: Vec<String>,
    ) -> Self {
        Self {
            directive: build_directive(input),
            credential: credential.into(),
            candidate_models,
        }
    }
}

/// The successful outcome of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedLetter {
    pub text: String,
    /// The candidate that produced `text`.
    pub model: String,
    /// Backend calls made, including the successful one.
    pub attempts: usize,
}

#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    candidate_timeout: Duration,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, candidate_timeout: Duration) -> Self {
        Self {
            backend,
            candidate_timeout,
        }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedLetter, GenerationError> {
        if request.candidate_models.is_empty() {
            return Err(GenerationError::NoCandidates);
        }

        let mut last_error: Option<LlmError> = None;
        let mut attempts = 0;

        for model in &request.candidate_models {
            attempts += 1;
            info!("Attempting generation with model: {model}");

            match self.attempt(model, request).await {
                Ok(text) => {
                    info!(
                        "Generation succeeded with {model} after {attempts} attempt(s), {} chars",
                        text.len()
                    );
                    return Ok(GeneratedLetter {
                        text,
                        model: model.clone(),
                        attempts,
                    });
                }
                Err(e) => {
                    warn!("Failed with model {model}: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(GenerationError::AllCandidatesExhausted {
            attempts,
            message: last_error
                .map(|e| e.to_string())
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GenerationError::FALLBACK_MESSAGE.to_string()),
        })
    }

    /// One bounded call against one candidate. Empty text is a failure.
    async fn attempt(&self, model: &str, request: &GenerationRequest) -> Result<String, LlmError> {
        let call = self
            .backend
            .generate_content(model, &request.directive, &request.credential);

        match tokio::time::timeout(self.candidate_timeout, call).await {
            Err(_) => Err(LlmError::Timeout {
                model: model.to_string(),
                seconds: self.candidate_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(Some(text))) if !text.is_empty() => Ok(text),
            Ok(Ok(_)) => Err(LlmError::EmptyContent),
        }
    }
}
