use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use handstand_api::{
    config::{Config, DEFAULT_VISION_MODELS, parse_models},
    domain::analysis::entity::AnalysisResult,
    infrastructure::{
        security::UploadValidator,
        storage::local_storage_service::LocalStorageService,
        vision::traits::{VisionError, VisionService},
    },
    presentation::http::{routes::create_router, state::AppState},
};
use std::{
    io::Cursor,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tower::ServiceExt;
use uuid::Uuid;

/// Vision provider double: answers with a canned result or a canned failure.
pub struct FakeVision {
    outcome: Result<AnalysisResult, VisionError>,
    configured: bool,
    calls: AtomicUsize,
}

impl FakeVision {
    pub fn answering(result: AnalysisResult) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(result),
            configured: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: VisionError) -> Arc<Self> {
        let configured = !matches!(err, VisionError::NotConfigured(_));
        Arc::new(Self {
            outcome: Err(err),
            configured,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionService for FakeVision {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze_posture(
        &self,
        _image: &[u8],
        _content_type: &str,
    ) -> Result<AnalysisResult, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub struct TestApp {
    pub app: Router,
    pub upload_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .expect("upload dir missing")
            .map(|entry| entry.expect("bad dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn build_config(upload_dir: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir,
        max_upload_bytes: 1024 * 1024,
        openai_api_key: None,
        openai_base_url: "http://127.0.0.1:9/v1".to_string(),
        vision_models: parse_models(DEFAULT_VISION_MODELS),
        vision_timeout_seconds: 1,
        openai_verify_key: false,
        delete_uploads_after_analysis: false,
    }
}

pub async fn spawn_app(vision: Arc<dyn VisionService>) -> TestApp {
    spawn_app_with(vision, |_| {}).await
}

pub async fn spawn_app_with(
    vision: Arc<dyn VisionService>,
    customize: impl FnOnce(&mut Config),
) -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = build_config(dir.path().join("uploads"));
    customize(&mut config);

    let storage = LocalStorageService::new(&config.upload_dir, "/uploads")
        .await
        .expect("failed to create storage");

    let state = AppState {
        storage: Arc::new(storage),
        vision,
        validator: Arc::new(UploadValidator::with_max_size(config.max_upload_bytes)),
        config: config.clone(),
    };

    TestApp {
        app: create_router(state),
        upload_dir: config.upload_dir,
        _dir: dir,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_text(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("invalid utf8")
}

pub async fn read_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub fn assert_status(status: StatusCode, expected: StatusCode) {
    assert_eq!(status, expected, "expected {}, got {}", expected, status);
}

pub fn tiny_jpeg_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(16, 24, image::Rgb([180, 140, 100]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("failed to encode jpeg");
    bytes
}

/// Build a multipart body with one file part.
pub fn multipart_file_body(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> (String, Vec<u8>) {
    let boundary = format!("----handstand-boundary-{}", Uuid::now_v7());
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (boundary, body)
}

pub fn multipart_request(uri: &str, boundary: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .expect("failed to build multipart request")
}
