use crate::{
    application::analyze_handstand::{dto::AnalyzeHandstandRequest, use_case::AnalyzeHandstandUseCase},
    domain::analysis::{errors::DomainError, value_objects::UploadedImage},
    presentation::http::{errors::AppError, state::AppState, templates::ResultPage},
};
use askama::Template;
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Html,
};

/// Form field names accepted for the photo.
const IMAGE_FIELDS: [&str; 2] = ["file", "image"];

/// Pull the first photo field out of the form.
///
/// Browsers submit an empty, nameless part when no file was chosen; that is
/// treated the same as a missing field.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<UploadedImage>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("");
        if !IMAGE_FIELDS.contains(&name) {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        if filename.is_empty() && data.is_empty() {
            continue;
        }

        return Ok(Some(UploadedImage {
            data,
            filename,
            content_type,
        }));
    }
    Ok(None)
}

pub async fn analyze_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, AppError> {
    let mut multipart = multipart?;
    let image = read_image_field(&mut multipart)
        .await?
        .ok_or(DomainError::MissingFile)?;

    tracing::info!(
        filename = %image.filename,
        size = image.data.len(),
        "Received handstand photo"
    );

    let use_case = AnalyzeHandstandUseCase::new(
        state.storage.clone(),
        state.vision.clone(),
        state.validator.clone(),
    )
    .delete_after_analysis(state.config.delete_uploads_after_analysis);

    let response = use_case.execute(AnalyzeHandstandRequest { image }).await?;
    let page = ResultPage::from(&response);
    Ok(Html(page.render()?))
}
