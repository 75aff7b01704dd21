use crate::domain::analysis::{
    errors::DomainError,
    value_objects::{AcceptedFormat, CheckedImage, UploadedImage},
};
use std::io::Cursor;
use tracing::{instrument, warn};

/// Configurable limits for uploaded photos
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub max_image_size_bytes: usize,
    pub allowed_formats: Vec<AcceptedFormat>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_image_size_bytes: 16 * 1024 * 1024, // 16MB
            allowed_formats: vec![AcceptedFormat::Png, AcceptedFormat::Jpeg, AcceptedFormat::Gif],
        }
    }
}

/// Checks an upload before anything is written to disk.
pub struct UploadValidator {
    config: ValidationConfig,
}

impl UploadValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn with_max_size(max_image_size_bytes: usize) -> Self {
        Self::new(ValidationConfig {
            max_image_size_bytes,
            ..ValidationConfig::default()
        })
    }

    /// Validate presence, size, extension, declared content type, magic bytes
    /// and that the header decodes to real dimensions.
    #[instrument(skip(self, upload), fields(filename = %upload.filename, file_size = upload.data.len()))]
    pub fn validate(&self, upload: &UploadedImage) -> Result<CheckedImage, DomainError> {
        if upload.filename.trim().is_empty() {
            return Err(DomainError::MissingFile);
        }

        if upload.data.is_empty() {
            return Err(DomainError::EmptyFile);
        }

        if upload.data.len() > self.config.max_image_size_bytes {
            return Err(DomainError::TooLarge {
                size: upload.data.len(),
                max: self.config.max_image_size_bytes,
            });
        }

        let extension = upload.extension().unwrap_or("");
        let claimed = AcceptedFormat::from_extension(extension)
            .filter(|f| self.config.allowed_formats.contains(f))
            .ok_or_else(|| {
                let shown = if extension.is_empty() { "no extension" } else { extension };
                DomainError::UnsupportedFormat(format!("'{}'", shown))
            })?;

        if let Some(content_type) = upload.content_type.as_deref() {
            if !Self::is_image_content_type(content_type) {
                return Err(DomainError::UnsupportedFormat(content_type.to_string()));
            }
        }

        let sniffed = image::guess_format(&upload.data)
            .ok()
            .and_then(AcceptedFormat::from_image_format)
            .filter(|f| self.config.allowed_formats.contains(f))
            .ok_or_else(|| {
                DomainError::UnsupportedFormat("file content is not a PNG, JPEG or GIF image".into())
            })?;

        if sniffed != claimed {
            warn!(
                claimed = claimed.extension(),
                sniffed = sniffed.extension(),
                "Upload extension does not match its content, trusting content"
            );
        }

        let (width, height) = image::ImageReader::with_format(
            Cursor::new(upload.data.as_ref()),
            sniffed.image_format(),
        )
        .into_dimensions()
        .map_err(|e| DomainError::CorruptImage(e.to_string()))?;

        Ok(CheckedImage {
            format: sniffed,
            width,
            height,
        })
    }

    fn is_image_content_type(content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        essence.starts_with("image/") || essence == "application/octet-stream"
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
