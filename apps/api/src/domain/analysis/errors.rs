use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Please choose a handstand photo to upload")]
    MissingFile,
    #[error("The uploaded file is empty")]
    EmptyFile,
    #[error("Unsupported file type: {0}. Upload a PNG, JPEG or GIF image")]
    UnsupportedFormat(String),
    #[error("The file is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("The uploaded file is not a readable image: {0}")]
    CorruptImage(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Posture analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("Posture analysis timed out")]
    AnalysisTimedOut,
    #[error("Posture analysis is unavailable: {0}")]
    AnalysisUnavailable(String),
}

impl DomainError {
    /// True for errors caused by what the user sent rather than by the server.
    pub fn is_upload_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::EmptyFile
                | Self::UnsupportedFormat(_)
                | Self::TooLarge { .. }
                | Self::CorruptImage(_)
        )
    }
}
