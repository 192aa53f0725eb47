use anyhow::{bail, Context, Result};

/// Default Gemini REST endpoint (v1beta exposes every model in the candidate list).
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Candidate models in preference order. The first one that returns text wins.
pub const DEFAULT_CANDIDATE_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.5-flash-001",
    "gemini-2.5-pro",
    "gemini-pro",
];

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on malformed values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_api_base: String,
    pub candidate_models: Vec<String>,
    pub candidate_timeout_secs: u64,
    /// Per-file upload limit in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let candidate_models = match std::env::var("CANDIDATE_MODELS") {
            Ok(raw) => parse_candidate_models(&raw)?,
            Err(_) => DEFAULT_CANDIDATE_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let max_upload_mb = optional_env("MAX_UPLOAD_MB", "5")
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            gemini_api_base: optional_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            candidate_models,
            candidate_timeout_secs: optional_env("CANDIDATE_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("CANDIDATE_TIMEOUT_SECS must be a whole number of seconds")?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

/// Parses a comma-separated model list, keeping order. Blank entries are dropped.
pub fn parse_candidate_models(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        bail!("CANDIDATE_MODELS must name at least one model");
    }
    Ok(models)
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
