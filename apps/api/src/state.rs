use crate::config::Config;
use crate::generation::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Candidate fallback chain over the configured generation backend.
    pub orchestrator: Orchestrator,
}
