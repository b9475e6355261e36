use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use futures::StreamExt;
use infranodus_core::request::GraphQueryRequest;
use infranodus_core::{GraphGateway, GraphResponse, NodusError, NodusResult, StreamRegistry};
use infranodus_http::{AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct MockGateway {
    calls: AtomicUsize,
    fail: bool,
    upstream_error: Option<&'static str>,
}

#[async_trait]
impl GraphGateway for MockGateway {
    async fn send(&self, _request: &GraphQueryRequest) -> NodusResult<GraphResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NodusError::RemoteApi {
                status: Some(503),
                body: "unavailable".to_string(),
            });
        }
        Ok(GraphResponse {
            ai_advice: Some(vec![json!("How do qubits relate to error correction?")]),
            error: self.upstream_error.map(str::to_string),
            ..GraphResponse::default()
        })
    }
}

fn build(gateway: Arc<MockGateway>) -> (Router, AppState) {
    let state = AppState::new(gateway, StreamRegistry::new());
    (router(state.clone()), state)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_reports_status_and_connections() {
    let (app, _) = build(Arc::new(MockGateway::default()));
    let response = app.oneshot(get("/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sse"]["activeConnections"], 0);
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn tools_lists_catalog_names() {
    let (app, _) = build(Arc::new(MockGateway::default()));
    let response = app.oneshot(get("/api/tools")).await.expect("response");

    let body = json_body(response).await;
    let tools = body["tools"].as_array().expect("tool list");
    assert_eq!(tools.len(), 13);
    assert!(tools.contains(&json!("analyzeExistingGraphByName")));
    assert!(tools.contains(&json!("fetch")));
}

#[tokio::test]
async fn analyze_returns_questions_and_releases_stream() {
    let gateway = Arc::new(MockGateway::default());
    let (app, state) = build(Arc::clone(&gateway));
    let response = app
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "text": "quantum computing", "streamId": "s1", "options": { "gapDepth": 1 } }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "streamId": "s1",
            "result": { "questions": ["How do qubits relate to error correction?"] }
        })
    );
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    assert!(state.streams().is_empty());
}

#[tokio::test]
async fn analyze_rejects_empty_text_without_calling_upstream() {
    let gateway = Arc::new(MockGateway::default());
    let (app, _) = build(Arc::clone(&gateway));
    let response = app
        .oneshot(post_json("/api/analyze", &json!({ "text": "" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "text is required and must not be empty" })
    );
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn analyze_rejects_a_stream_id_in_use() {
    let (app, state) = build(Arc::new(MockGateway::default()));
    let _held = state.streams().register("busy").expect("registered");

    let response = app
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "text": "quantum", "streamId": "busy" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn analyze_mirrors_checkpoints_to_attached_client() {
    let (app, state) = build(Arc::new(MockGateway::default()));
    let mut events = state.clients().attach("watched");

    let response = app
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "text": "quantum", "streamId": "watched" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let mut received = 0;
    while let Some(Some(_)) = tokio::time::timeout(Duration::from_millis(50), events.next())
        .await
        .ok()
    {
        received += 1;
    }
    // starting, 25, 50, 75, 90, 100, and the terminal marker
    assert_eq!(received, 7);
}

#[tokio::test]
async fn analyze_upstream_error_ends_sse_session_with_error_event() {
    let gateway = Arc::new(MockGateway {
        upstream_error: Some("quota exceeded"),
        ..MockGateway::default()
    });
    let (app, state) = build(gateway);
    let listener = app
        .clone()
        .oneshot(get("/sse/stream/w"))
        .await
        .expect("response");
    let mut frames = listener.into_body().into_data_stream();

    let response = app
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "text": "quantum", "streamId": "w" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "quota exceeded" })
    );

    let mut seen = Vec::new();
    while let Ok(Some(Ok(frame))) =
        tokio::time::timeout(Duration::from_millis(50), frames.next()).await
    {
        seen.push(String::from_utf8(frame.to_vec()).expect("utf8"));
    }
    let last = seen.last().expect("frames received");
    assert!(last.starts_with("event: error"), "{last}");
    assert!(last.contains("quota exceeded"), "{last}");
    assert!(
        !seen.iter().any(|frame| frame.starts_with("event: complete")),
        "{seen:?}"
    );
    assert!(state.streams().is_empty());
}

#[tokio::test]
async fn command_dispatches_by_name() {
    let gateway = Arc::new(MockGateway::default());
    let (app, _) = build(Arc::clone(&gateway));
    let response = app
        .oneshot(post_json(
            "/api/command",
            &json!({
                "command": "generate_research_questions",
                "params": { "text": "quantum" },
                "streamId": "c1"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "streamId": "c1",
            "result": { "questions": ["How do qubits relate to error correction?"] }
        })
    );
}

#[tokio::test]
async fn command_rejects_unknown_tools() {
    let gateway = Arc::new(MockGateway::default());
    let (app, _) = build(Arc::clone(&gateway));
    let response = app
        .oneshot(post_json(
            "/api/command",
            &json!({ "command": "dropGraph", "params": {} }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn command_surfaces_remote_failures_as_bad_gateway() {
    let gateway = Arc::new(MockGateway {
        fail: true,
        ..MockGateway::default()
    });
    let (app, _) = build(gateway);
    let response = app
        .oneshot(post_json(
            "/api/command",
            &json!({ "command": "generateContentGaps", "params": { "text": "quantum" } }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "API request failed (503): unavailable" })
    );
}

#[tokio::test]
async fn cancel_marks_stream_inactive() {
    let (app, state) = build(Arc::new(MockGateway::default()));
    let _session = state.streams().register("s2").expect("registered");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/sse/stream/s2")
        .body(Body::empty())
        .expect("request builds");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!state.streams().is_active("s2"));

    let missing = Request::builder()
        .method(Method::DELETE)
        .uri("/sse/stream/unknown")
        .body(Body::empty())
        .expect("request builds");
    let response = app.oneshot(missing).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sse_stream_opens_with_connected_event() {
    let (app, state) = build(Arc::new(MockGateway::default()));
    let response = app
        .oneshot(get("/sse/stream/live"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/event-stream")
    );
    assert_eq!(state.clients().len(), 1);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.expect("frame").expect("bytes");
    let frame = String::from_utf8(first.to_vec()).expect("utf8");
    assert!(frame.starts_with("event: connected"), "{frame}");

    drop(body);
    assert!(state.clients().is_empty());
}
