use crate::domain::analysis::{entity::AnalysisResult, errors::DomainError};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisionError {
    #[error("vision provider is not configured: {0}")]
    NotConfigured(String),
    #[error("API key validation failed with status {0}")]
    KeyRejected(u16),
    #[error("vision request timed out")]
    Timeout,
    #[error("vision request failed: {0}")]
    Transport(String),
    #[error("malformed vision response: {0}")]
    MalformedResponse(String),
    #[error("all vision models failed: {}", .0.join(", "))]
    AllModelsFailed(Vec<String>),
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!(reqwest_timeout = %err);
            VisionError::Timeout
        } else if err.is_decode() {
            VisionError::MalformedResponse(err.to_string())
        } else {
            tracing::warn!(reqwest_error = %err);
            VisionError::Transport(err.to_string())
        }
    }
}

impl From<VisionError> for DomainError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Timeout => DomainError::AnalysisTimedOut,
            VisionError::NotConfigured(msg) => DomainError::AnalysisUnavailable(msg),
            other => DomainError::AnalysisFailed(other.to_string()),
        }
    }
}

/// An image-understanding provider able to judge handstand posture.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Short provider name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Whether the provider has the credentials it needs
    fn is_configured(&self) -> bool;

    /// Classify the posture shown in `image` (encoded as `content_type`)
    async fn analyze_posture(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<AnalysisResult, VisionError>;
}
