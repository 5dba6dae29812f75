//! Integration tests for the full upload → classify → render cycle.
//!
//! A local `wiremock` server plays both the generation service and the
//! Kroki renderer, so these run offline and in CI.
//!
//! Run with:
//!   cargo test --test flow -- --nocapture

use edgequake_pdf2map::render::{
    CONNECTION_ERROR_MESSAGE, INVALID_DIAGRAM_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
use edgequake_pdf2map::{
    generate, generate_to_file, output, ClientConfig, Controller, Pdf2MapError, ResponseMode,
    ResultArea, SelectedFile, UiEvent,
};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><g/></svg>"#;

fn pdf() -> SelectedFile {
    SelectedFile::new("lecture.pdf", "application/pdf", b"%PDF-1.4\n%%EOF".to_vec())
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .server_url(server.uri())
        .renderer_url(server.uri())
        .build()
        .expect("valid config")
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 120, 200, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

async fn mount_kroki(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .mount(server)
        .await;
}

/// URL of a local port that was bound and released, so nothing listens there.
fn released_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

/// Route library logs to the test harness; `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn run(server: &MockServer) -> ResultArea {
    init_tracing();
    let mut controller = Controller::new(config_for(server)).unwrap();
    controller.dispatch(UiEvent::FileChosen(vec![pdf()])).await.unwrap();
    controller.dispatch(UiEvent::GenerateClicked).await.unwrap();
    controller.result().clone()
}

// ── Diagram responses ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_diagram_response_rendered_through_kroki() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "mermaid_code": "```mermaid\ngraph TD\nA-->B\n```" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .and(body_partial_json(json!({ "diagram_source": "graph TD\nA-->B" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .expect(1)
        .mount(&server)
        .await;

    match run(&server).await {
        ResultArea::Diagram { svg } => {
            assert!(svg.starts_with(r#"<svg id="graphDiv""#), "got: {svg}");
            assert!(svg.contains("<g/>"));
        }
        other => panic!("expected a diagram, got {other:?}"),
    }
}

#[tokio::test]
async fn test_theme_forwarded_to_renderer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph LR; X-->Y" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .and(body_partial_json(json!({ "diagram_options": { "theme": "forest" } })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .server_url(server.uri())
        .renderer_url(server.uri())
        .diagram_theme("forest")
        .build()
        .unwrap();
    let mut controller = Controller::new(config).unwrap();
    controller.choose_files(vec![pdf()]).unwrap();
    let area = controller.generate().await.unwrap();
    assert_eq!(area.state_name(), "diagram");
}

#[tokio::test]
async fn test_renderer_syntax_error_shows_invalid_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph ???" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Parse error on line 1"))
        .mount(&server)
        .await;

    assert_eq!(
        run(&server).await,
        ResultArea::Error {
            message: INVALID_DIAGRAM_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_renderer_server_error_shows_invalid_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph TD; A-->B" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(INVALID_DIAGRAM_MESSAGE));
}

#[tokio::test]
async fn test_renderer_non_svg_body_shows_invalid_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph TD; A-->B" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html><body>maintenance</body></html>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(INVALID_DIAGRAM_MESSAGE));
}

#[tokio::test]
async fn test_unreachable_renderer_shows_invalid_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph TD; A-->B" })))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .server_url(server.uri())
        .renderer_url(released_port_url())
        .build()
        .unwrap();
    let mut controller = Controller::new(config).unwrap();
    controller.choose_files(vec![pdf()]).unwrap();
    let area = controller.generate().await.unwrap();
    assert_eq!(area.error_message(), Some(INVALID_DIAGRAM_MESSAGE));
}

#[tokio::test]
async fn test_missing_mermaid_code_is_invalid_diagram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;
    // Nothing to render, so the renderer must not be called.
    Mock::given(method("POST"))
        .and(path("/mermaid/svg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(INVALID_DIAGRAM_MESSAGE));
}

// ── Image responses ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_image_response_becomes_image_ref() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png_bytes(4, 3), "image/png"))
        .mount(&server)
        .await;

    match run(&server).await {
        ResultArea::Image(img) => {
            assert_eq!(img.media_type(), "image/png");
            assert_eq!(img.dimensions(), Some((4, 3)));
            assert!(img.data_uri().starts_with("data:image/png;base64,"));
        }
        other => panic!("expected an image, got {other:?}"),
    }
}

#[tokio::test]
async fn test_image_mode_ignores_generic_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(png_bytes(2, 2), "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .server_url(server.uri())
        .response_mode(ResponseMode::Image)
        .build()
        .unwrap();
    let mut controller = Controller::new(config).unwrap();
    controller.choose_files(vec![pdf()]).unwrap();
    let area = controller.generate().await.unwrap();
    assert_eq!(area.state_name(), "image");
}

// ── Error responses ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_message_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({ "error": "file too large" })))
        .mount(&server)
        .await;

    let area = run(&server).await;
    assert_eq!(area.error_message(), Some("file too large"));
    assert_eq!(
        output::to_html(&area),
        r#"<div class="error-message">file too large</div>"#
    );
}

#[tokio::test]
async fn test_server_error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(UNKNOWN_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_server_error_with_html_body_shows_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(502).set_body_raw("<h1>502 Bad Gateway</h1>", "text/html"))
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(CONNECTION_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_unreachable_server_shows_connection_error() {
    let config = ClientConfig::builder()
        .server_url(released_port_url())
        .build()
        .unwrap();
    let mut controller = Controller::new(config).unwrap();
    controller.choose_files(vec![pdf()]).unwrap();

    let area = controller.generate().await.unwrap();
    assert_eq!(area.error_message(), Some(CONNECTION_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_malformed_success_body_shows_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json {", "application/json"))
        .mount(&server)
        .await;

    assert_eq!(run(&server).await.error_message(), Some(CONNECTION_ERROR_MESSAGE));
}

// ── Request shape ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_is_single_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({ "error": "file too large" })))
        .expect(1)
        .mount(&server)
        .await;

    run(&server).await;

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"), "got: {content_type}");

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="file""#), "body: {body}");
    assert!(body.contains(r#"filename="lecture.pdf""#), "body: {body}");
    assert!(body.contains("Content-Type: application/pdf") || body.contains("content-type: application/pdf"));
    assert!(body.contains("%PDF-1.4"));
}

#[tokio::test]
async fn test_nothing_selected_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = Controller::new(config_for(&server)).unwrap();
    let err = controller
        .dispatch(UiEvent::GenerateClicked)
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2MapError::NoFileSelected));
    assert_eq!(controller.result(), &ResultArea::Empty);
}

#[tokio::test]
async fn test_rejected_drop_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = Controller::new(config_for(&server)).unwrap();
    controller.dispatch(UiEvent::DragEnter).await.unwrap();
    let photo = SelectedFile::new("photo.png", "image/png", png_bytes(1, 1));
    assert!(controller.dispatch(UiEvent::Drop(vec![photo])).await.is_err());
    assert!(!controller.is_drop_target_active());
    assert!(!controller.can_generate());
    assert!(controller.dispatch(UiEvent::GenerateClicked).await.is_err());
}

// ── One-shot entry points ────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_to_file_writes_svg() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mermaid_code": "graph TD; A-->B" })))
        .mount(&server)
        .await;
    mount_kroki(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let input: PathBuf = dir.path().join("lecture.pdf");
    std::fs::write(&input, b"%PDF-1.4\n%%EOF").unwrap();
    let out = dir.path().join("out/map.svg");

    let written = generate_to_file(&input, &out, &config_for(&server))
        .await
        .unwrap();
    let svg = std::fs::read_to_string(written).unwrap();
    assert!(svg.contains(r#"id="graphDiv""#));
}

#[tokio::test]
async fn test_generate_missing_input_file() {
    let server = MockServer::start().await;
    let err = generate("/definitely/not/here.pdf", &config_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2MapError::FileNotFound { .. }));
}
