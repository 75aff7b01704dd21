use crate::{
    application::analyze_handstand::dto::{AnalyzeHandstandRequest, AnalyzeHandstandResponse},
    domain::analysis::{
        entity::AnalysisResult,
        errors::DomainError,
        value_objects::{StoredImage, storage_key_for},
    },
    infrastructure::{
        security::UploadValidator, storage::traits::StorageService, vision::traits::VisionService,
    },
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Runs one upload through validation, storage and posture analysis.
///
/// Validation happens before anything touches the disk, so a rejected upload
/// leaves no file behind. Analysis failures are returned after the optional
/// cleanup has run.
pub struct AnalyzeHandstandUseCase {
    storage: Arc<dyn StorageService>,
    vision: Arc<dyn VisionService>,
    validator: Arc<UploadValidator>,
    delete_after_analysis: bool,
}

impl AnalyzeHandstandUseCase {
    pub fn new(
        storage: Arc<dyn StorageService>,
        vision: Arc<dyn VisionService>,
        validator: Arc<UploadValidator>,
    ) -> Self {
        Self {
            storage,
            vision,
            validator,
            delete_after_analysis: false,
        }
    }

    pub fn delete_after_analysis(mut self, enabled: bool) -> Self {
        self.delete_after_analysis = enabled;
        self
    }

    #[instrument(skip(self, request), fields(
        filename = %request.image.filename,
        image_size = request.image.data.len()
    ))]
    pub async fn execute(
        &self,
        request: AnalyzeHandstandRequest,
    ) -> Result<AnalyzeHandstandResponse, DomainError> {
        let checked = self.validator.validate(&request.image)?;
        let key = storage_key_for(&request.image.filename, checked.format);
        debug!(key = %key, format = checked.format.mime(), "Upload accepted");

        let url = self
            .storage
            .upload(&key, request.image.data.to_vec(), checked.format.mime())
            .await
            .map_err(|e| {
                error!("Storage upload failed for {}: {:#}", key, e);
                DomainError::Storage(e.to_string())
            })?;

        let stored = StoredImage {
            key,
            url,
            format: checked.format,
            size_bytes: request.image.data.len(),
            width: checked.width,
            height: checked.height,
        };

        let outcome = self.analyze(&stored).await;

        let image_retained = if self.delete_after_analysis {
            match self.storage.delete(&stored.key).await {
                Ok(()) => false,
                Err(e) => {
                    warn!("Failed to remove {} after analysis: {:#}", stored.key, e);
                    true
                }
            }
        } else {
            true
        };

        Ok(AnalyzeHandstandResponse {
            stored,
            result: outcome?,
            image_retained,
        })
    }

    /// Read a stored photo back and ask the vision provider about it.
    #[instrument(skip(self, stored), fields(key = %stored.key, provider = self.vision.name()))]
    pub async fn analyze(&self, stored: &StoredImage) -> Result<AnalysisResult, DomainError> {
        let data = self.storage.read(&stored.key).await.map_err(|e| {
            error!("Failed to read back {}: {:#}", stored.key, e);
            DomainError::Storage(e.to_string())
        })?;

        let result = self
            .vision
            .analyze_posture(&data, stored.format.mime())
            .await
            .map_err(|e| {
                warn!("Vision analysis failed for {}: {}", stored.key, e);
                DomainError::from(e)
            })?;

        info!(
            form_quality = result.form_quality.label(),
            banana_back = result.banana_back(),
            "Analysis complete"
        );
        Ok(result)
    }
}
