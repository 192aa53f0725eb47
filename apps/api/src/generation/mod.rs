// Cover letter generation: directive construction, ordered model fallback,
// and the HTTP handler. All Gemini calls go through llm_client.

pub mod handlers;
pub mod orchestrator;
pub mod prompts;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every candidate failed; carries the last candidate's failure message.
    #[error("{message}")]
    AllCandidatesExhausted { attempts: usize, message: String },

    #[error("no candidate models configured")]
    NoCandidates,
}

impl GenerationError {
    pub const FALLBACK_MESSAGE: &'static str =
        "Failed to generate cover letter. Please check your API key and try again.";
}
