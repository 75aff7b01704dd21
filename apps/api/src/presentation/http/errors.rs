//! HTTP error handling and response conversion.
//!
//! Every failure in the request lifecycle ends up here and is rendered as
//! HTML: problems with what the user sent re-render the upload form with an
//! inline message, everything else renders the error page. Nothing is allowed
//! to escape as an unhandled fault.

use crate::domain::analysis::errors::DomainError;
use crate::presentation::http::templates::{ErrorPage, IndexPage};
use askama::Template;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing, empty or non-image upload (400, form re-rendered).
    InvalidUpload(String),

    /// Upload exceeds the configured size (413, form re-rendered).
    PayloadTooLarge(String),

    /// Writing or reading the upload directory failed (500).
    Storage(String),

    /// The vision provider failed or answered nonsense (502).
    ExternalService(String),

    /// The vision provider did not answer in time (504).
    GatewayTimeout,

    /// The vision provider is not configured (503).
    ServiceUnavailable(String),

    /// Unclassified internal error (500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUpload(msg) => write!(f, "Invalid upload: {}", msg),
            Self::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::ExternalService(msg) => write!(f, "External service error: {}", msg),
            Self::GatewayTimeout => write!(f, "External service timed out"),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get a user-safe error message (without implementation details).
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUpload(msg) | Self::PayloadTooLarge(msg) => msg.clone(),
            Self::Storage(_) => "We could not save your photo. Please try again.".into(),
            Self::ExternalService(_) => {
                "The posture analysis service failed to analyse your photo. Please try again.".into()
            }
            Self::GatewayTimeout => {
                "The posture analysis service took too long to answer. Please try again.".into()
            }
            Self::ServiceUnavailable(_) => {
                "Posture analysis is not available right now because the vision service is not configured."
                    .into()
            }
            Self::Internal(_) => "Something went wrong on our side.".into(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::InvalidUpload(_) | Self::PayloadTooLarge(_) => "Upload rejected",
            Self::Storage(_) | Self::Internal(_) => "Server error",
            Self::ExternalService(_) | Self::GatewayTimeout | Self::ServiceUnavailable(_) => {
                "Analysis failed"
            }
        }
    }

    /// Upload problems are shown inline on the form instead of an error page.
    fn renders_form(&self) -> bool {
        matches!(self, Self::InvalidUpload(_) | Self::PayloadTooLarge(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!("error={}", self),
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT | StatusCode::SERVICE_UNAVAILABLE => {
                tracing::warn!("error={}", self)
            }
            _ => tracing::info!("error={}", self),
        }

        let rendered = if self.renders_form() {
            IndexPage {
                error: Some(message.clone()),
            }
            .render()
        } else {
            ErrorPage {
                status: status.as_u16(),
                title: self.title().to_string(),
                message: message.clone(),
            }
            .render()
        };

        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(template_error = %err, "Failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

// === Domain Error Conversion ===

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            e if e.is_upload_error() => AppError::InvalidUpload(e.to_string()),
            DomainError::Storage(msg) => AppError::Storage(msg),
            DomainError::AnalysisFailed(msg) => AppError::ExternalService(msg),
            DomainError::AnalysisTimedOut => AppError::GatewayTimeout,
            DomainError::AnalysisUnavailable(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

// === Multipart Error Conversion ===

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        tracing::debug!(multipart_rejection = %err);
        AppError::InvalidUpload(DomainError::MissingFile.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!(multipart_error = %err);
            AppError::PayloadTooLarge("The uploaded file is too large".into())
        } else {
            tracing::debug!(multipart_error = %err);
            AppError::InvalidUpload("The upload could not be read. Please choose a photo and try again".into())
        }
    }
}

// === Template Error Conversion ===

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {}", err))
    }
}
