//! Application configuration loading from environment variables.
//!
//! All configuration is read once at startup. A `.env` file is honoured via
//! `dotenvy` before this runs.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (default: "info,handstand_api=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 1010)
//! - `UPLOAD_DIR`: Directory for uploaded photos, created if absent (default: "uploads")
//! - `MAX_UPLOAD_BYTES`: Largest accepted photo (default: 16 MiB)
//! - `OPENAI_API_KEY`: API key for the vision provider. Without it the server still
//!   starts but every analysis request fails with a "not configured" page.
//! - `OPENAI_BASE_URL`: OpenAI-compatible API root (default: "https://api.openai.com/v1")
//! - `VISION_MODELS`: Comma separated models tried in order
//!   (default: "gpt-4o,gpt-4-turbo,gpt-4-turbo-2024-04-09")
//! - `VISION_TIMEOUT_SECONDS`: Per-request timeout for the vision call (default: 30)
//! - `OPENAI_VERIFY_KEY`: Check the key against `/models` before analysing (default: true)
//! - `DELETE_UPLOADS_AFTER_ANALYSIS`: Remove photos once analysed (default: false)

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_VISION_MODELS: &str = "gpt-4o,gpt-4-turbo,gpt-4-turbo-2024-04-09";

/// Complete server configuration loaded from environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory uploaded photos are written to
    pub upload_dir: PathBuf,

    /// Maximum size of a single uploaded photo in bytes
    pub max_upload_bytes: usize,

    /// API key for the OpenAI-compatible vision endpoint
    pub openai_api_key: Option<String>,

    /// Root URL of the OpenAI-compatible API, without trailing slash
    pub openai_base_url: String,

    /// Vision models tried in order until one answers
    pub vision_models: Vec<String>,

    /// Timeout applied to every vision HTTP request
    pub vision_timeout_seconds: u64,

    /// Validate the API key with a `/models` call before each analysis
    pub openai_verify_key: bool,

    /// Remove the stored photo once analysis has finished
    pub delete_uploads_after_analysis: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed to the
    /// expected type.
    pub fn from_env() -> anyhow::Result<Self> {
        let models: String = env_or("VISION_MODELS", DEFAULT_VISION_MODELS.to_string())?;

        Ok(Self {
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 1010)?,
            upload_dir: env_or("UPLOAD_DIR", PathBuf::from("uploads"))?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_base_url: env_or(
                "OPENAI_BASE_URL",
                "https://api.openai.com/v1".to_string(),
            )?
            .trim_end_matches('/')
            .to_string(),
            vision_models: parse_models(&models),
            vision_timeout_seconds: env_or("VISION_TIMEOUT_SECONDS", 30)?,
            openai_verify_key: env_or("OPENAI_VERIFY_KEY", true)?,
            delete_uploads_after_analysis: env_or("DELETE_UPLOADS_AFTER_ANALYSIS", false)?,
        })
    }
}

/// Split a comma separated model list, falling back to the defaults when
/// nothing usable is left.
pub fn parse_models(raw: &str) -> Vec<String> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        tracing::warn!("VISION_MODELS is empty, using defaults");
        return parse_models(DEFAULT_VISION_MODELS);
    }
    models
}

/// Load an environment variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
