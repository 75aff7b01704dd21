use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    upload_dir: &'static str,
    vision_provider: &'static str,
    vision: &'static str,
    version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Check the upload directory is still there
    let upload_dir = match tokio::fs::metadata(&state.config.upload_dir).await {
        Ok(meta) if meta.is_dir() => "up",
        Ok(_) => {
            tracing::error!("Health check failed: upload path is not a directory");
            "down"
        }
        Err(e) => {
            tracing::error!("Health check failed: upload directory unreachable: {}", e);
            "down"
        }
    };

    // A missing API key degrades analysis but the form still works
    let vision = if state.vision.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    let status = if upload_dir == "up" {
        "healthy"
    } else {
        "unhealthy"
    };

    let response = HealthResponse {
        status,
        upload_dir,
        vision_provider: state.vision.name(),
        vision,
        version: env!("CARGO_PKG_VERSION"),
    };

    let code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
