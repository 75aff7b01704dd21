use crate::presentation::http::{errors::AppError, templates::IndexPage};
use askama::Template;
use axum::response::Html;

pub async fn upload_form() -> Result<Html<String>, AppError> {
    Ok(Html(IndexPage { error: None }.render()?))
}
