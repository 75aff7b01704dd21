use super::helpers::{
    FakeVision, assert_status, multipart_file_body, multipart_request, read_text, send,
    spawn_app, spawn_app_with, tiny_jpeg_bytes,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use handstand_api::{
    domain::analysis::entity::{AnalysisResult, FormQuality},
    infrastructure::vision::traits::VisionError,
};

const CORE_ADVICE: &str = "Engage your core and squeeze your glutes to flatten the arch.";

fn banana_back() -> AnalysisResult {
    AnalysisResult::from_model_reply(&format!(
        r#"{{"banana_back": true, "advice": "{}"}}"#,
        CORE_ADVICE
    ))
}

#[tokio::test]
async fn handstand_photo_renders_the_coaching_advice() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::OK);
    let html = read_text(res).await;
    assert!(html.contains(CORE_ADVICE), "advice missing from: {html}");
    assert!(html.contains("Banana back detected"));
    assert_eq!(vision.calls(), 1);

    let files = app.stored_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("-handstand.jpg"), "unexpected stored name {}", files[0]);
}

#[tokio::test]
async fn analyze_and_upload_routes_accept_the_same_form() {
    let vision = FakeVision::answering(AnalysisResult::new(FormQuality::Good, ""));
    let app = spawn_app(vision.clone()).await;

    for uri in ["/analyze", "/upload"] {
        let (boundary, body) =
            multipart_file_body("image", "me.jpeg", "image/jpeg", &tiny_jpeg_bytes());
        let res = send(&app.app, multipart_request(uri, &boundary, body)).await;
        assert_status(res.status(), StatusCode::OK);
        let html = read_text(res).await;
        assert!(html.contains("good form"));
        assert!(html.contains("class=\"advice\""));
    }
    assert_eq!(vision.calls(), 2);
    assert_eq!(app.stored_files().len(), 2);
}

#[tokio::test]
async fn empty_body_re_renders_form_with_inline_error() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::empty())
        .expect("failed to build request");
    let res = send(&app.app, req).await;

    assert_status(res.status(), StatusCode::BAD_REQUEST);
    let html = read_text(res).await;
    assert!(html.contains("<form"));
    assert!(html.contains("Please choose a handstand photo to upload"));
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn form_without_file_part_is_rejected() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let boundary = "----handstand-boundary-no-file";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let res = send(
        &app.app,
        multipart_request("/analyze", boundary, body.into_bytes()),
    )
    .await;

    assert_status(res.status(), StatusCode::BAD_REQUEST);
    assert!(read_text(res).await.contains("Please choose a handstand photo"));
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn empty_file_selection_counts_as_missing() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let (boundary, body) = multipart_file_body("file", "", "application/octet-stream", b"");
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::BAD_REQUEST);
    assert!(read_text(res).await.contains("Please choose a handstand photo"));
}

#[tokio::test]
async fn non_image_upload_is_rejected_without_calling_vision() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let (boundary, body) =
        multipart_file_body("file", "notes.txt", "text/plain", b"just some text");
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::BAD_REQUEST);
    let html = read_text(res).await;
    assert!(html.contains("Unsupported file type"));
    assert!(html.contains("<form"));
    assert_eq!(vision.calls(), 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn disguised_non_image_is_rejected() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app(vision.clone()).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", b"<html>not a photo</html>");
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app_with(vision.clone(), |config| config.max_upload_bytes = 100).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(read_text(res).await.contains("<form"));
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn body_over_request_limit_is_rejected() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app_with(vision.clone(), |config| config.max_upload_bytes = 100).await;

    // Larger than the photo limit plus multipart framing allowance
    let data = vec![0u8; 200 * 1024];
    let (boundary, body) = multipart_file_body("file", "handstand.jpg", "image/jpeg", &data);
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let html = read_text(res).await;
    assert!(html.contains("<form"));
    assert!(html.contains("too large"));
    assert_eq!(vision.calls(), 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn huge_configured_limit_still_accepts_uploads() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app_with(vision.clone(), |config| config.max_upload_bytes = usize::MAX).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::OK);
    assert_eq!(vision.calls(), 1);
}

#[tokio::test]
async fn vision_failure_renders_error_page() {
    let vision = FakeVision::failing(VisionError::AllModelsFailed(vec!["gpt-4o (500)".into()]));
    let app = spawn_app(vision.clone()).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::BAD_GATEWAY);
    let html = read_text(res).await;
    assert!(html.contains("Analysis failed"));
    assert!(!html.contains("gpt-4o (500)"), "upstream detail leaked: {html}");
}

#[tokio::test]
async fn vision_timeout_renders_error_page() {
    let vision = FakeVision::failing(VisionError::Timeout);
    let app = spawn_app(vision).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(read_text(res).await.contains("took too long"));
}

#[tokio::test]
async fn unconfigured_vision_renders_error_page() {
    let vision = FakeVision::failing(VisionError::NotConfigured("OPENAI_API_KEY is not set".into()));
    let app = spawn_app(vision).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(read_text(res).await.contains("not configured"));
}

#[tokio::test]
async fn cleanup_mode_removes_photo_and_hides_it() {
    let vision = FakeVision::answering(banana_back());
    let app = spawn_app_with(vision, |config| config.delete_uploads_after_analysis = true).await;

    let (boundary, body) =
        multipart_file_body("file", "handstand.jpg", "image/jpeg", &tiny_jpeg_bytes());
    let res = send(&app.app, multipart_request("/", &boundary, body)).await;

    assert_status(res.status(), StatusCode::OK);
    let html = read_text(res).await;
    assert!(html.contains(CORE_ADVICE));
    assert!(!html.contains("<img"));
    assert!(app.stored_files().is_empty());
}
