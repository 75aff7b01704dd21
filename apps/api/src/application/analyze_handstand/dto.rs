use crate::domain::analysis::{
    entity::AnalysisResult,
    value_objects::{StoredImage, UploadedImage},
};

#[derive(Debug, Clone)]
pub struct AnalyzeHandstandRequest {
    pub image: UploadedImage,
}

#[derive(Debug, Clone)]
pub struct AnalyzeHandstandResponse {
    pub stored: StoredImage,
    pub result: AnalysisResult,
    /// False when the photo was removed after analysis
    pub image_retained: bool,
}
