#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use leaveplan::config::{AppConfig, OcrConfig};
use leaveplan::server::create_router;
use leaveplan::types::PlannerState;

pub const BOUNDARY: &str = "leaveplan-test-boundary";

/// Five Monday-to-Friday 09:00 classes of the same course.
pub const WEEKLY_TIMETABLE: &str = "\
Monday
09:00-10:00 CSE 101
Tuesday
09:00-10:00 CSE 101
Wednesday
09:00-10:00 CSE 101
Thursday
09:00-10:00 CSE 101
Friday
09:00-10:00 CSE 101
";

pub const CALENDAR: &str = "\
Date | Day | Holiday
02.01.2025 | Thursday | New Year Break
15.01.2025 Wednesday Pongal
31.03.2025 Monday Eid Holiday
";

/// Minimal stand-in for the OCR service.
///
/// The `X-File-Name` header picks the behaviour: `flaky*` fails once with
/// 503, `unsupported*` answers 415, `garbled*` answers JSON without `text`,
/// anything else gets `text` back.
pub struct OcrStub {
    pub text: String,
    pub calls: AtomicUsize,
}

impl OcrStub {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn recognize(State(stub): State<Arc<OcrStub>>, headers: HeaderMap, body: Bytes) -> Response {
    let call = stub.calls.fetch_add(1, Ordering::SeqCst);
    let file_name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "empty body").into_response();
    }
    if file_name.starts_with("flaky") && call == 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response();
    }
    if file_name.starts_with("unsupported") {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported media type").into_response();
    }
    if file_name.starts_with("garbled") {
        return Json(json!({ "pages": [] })).into_response();
    }
    Json(json!({ "text": stub.text })).into_response()
}

/// Starts the stub on an ephemeral port and returns its base URL.
pub async fn spawn_ocr_stub(text: &str) -> (String, Arc<OcrStub>) {
    let stub = Arc::new(OcrStub {
        text: text.to_string(),
        calls: AtomicUsize::new(0),
    });
    let app = Router::new()
        .route("/recognize", post(recognize))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

pub fn ocr_config(base_url: &str) -> OcrConfig {
    OcrConfig {
        base_url: base_url.to_string(),
        max_attempts: 3,
        retry_base_delay_ms: 1,
        timeout_secs: 5,
        connect_timeout_secs: 2,
    }
}

/// Router over an in-memory store, talking to the given OCR base URL.
pub fn test_router(ocr_base_url: &str) -> Router {
    let mut config = AppConfig::default();
    config.database.path = ":memory:".to_string();
    config.ocr = ocr_config(ocr_base_url);
    let state = PlannerState::new(config).unwrap();
    create_router(Arc::new(state))
}

/// Sends one request and decodes the JSON response.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A multipart form with text fields and an optional file field.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, file_name, contents)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
