use super::{
    handlers::{health, home, upload},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Room for multipart boundaries and headers on top of the photo itself, so an
/// oversized photo reaches the validator and gets a precise message.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        // Upload form and analysis
        .route("/", get(home::upload_form).post(upload::analyze_upload))
        .route("/analyze", post(upload::analyze_upload))
        .route("/upload", post(upload::analyze_upload))
        // Stored photos
        .nest_service("/uploads", uploads)
        // Health
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
