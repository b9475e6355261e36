use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use infranodus_core::request::{Endpoint, GraphQueryRequest};
use infranodus_core::{ApiConfig, GraphGateway, InfraNodusClient, NodusError};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone, Default)]
struct Seen {
    authorization: Option<String>,
    content_type: Option<String>,
    query: Option<String>,
    body: Option<Value>,
}

type Recorder = Arc<Mutex<Seen>>;

async fn record(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    *recorder.lock().expect("recorder poisoned") = Seen {
        authorization: header("authorization"),
        content_type: header("content-type"),
        query,
        body: Some(body),
    };
    Json(json!({
        "entriesAndGraphOfContext": {
            "graphSummary": "Wrapped summary",
            "extendedGraphSummary": { "contentGaps": ["a <-> b"] }
        }
    }))
}

async fn inline() -> Json<Value> {
    Json(json!({ "aiAdvice": ["What connects a and b?"] }))
}

async fn unauthorized() -> (StatusCode, &'static str) {
    (StatusCode::UNAUTHORIZED, "invalid api key")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({}))
}

async fn spawn_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api/v1/graphAndStatements", post(record))
        .route("/api/v1/graphAndAdvice", post(inline))
        .route("/api/v1/search", post(unauthorized))
        .route("/slow/v1/search", post(slow))
        .with_state(Arc::clone(&recorder));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test upstream");
    });
    (addr, recorder)
}

fn client(addr: SocketAddr, prefix: &str) -> InfraNodusClient {
    let config = ApiConfig::new("test-key")
        .with_api_base(format!("http://{addr}/{prefix}/v1/"))
        .with_request_timeout(Duration::from_millis(200));
    InfraNodusClient::new(config).expect("client builds")
}

#[tokio::test]
async fn sends_bearer_token_query_and_body() {
    let (addr, recorder) = spawn_upstream().await;
    let request = GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("optimize", "develop")
        .with_body("text", "a and b");

    let response = client(addr, "api")
        .send(&request)
        .await
        .expect("request succeeds");

    assert_eq!(response.graph_summary.as_deref(), Some("Wrapped summary"));
    let seen = recorder.lock().expect("recorder poisoned").clone();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(seen.query.as_deref(), Some("doNotSave=true&optimize=develop"));
    assert_eq!(seen.body, Some(json!({ "text": "a and b" })));
}

#[tokio::test]
async fn accepts_inline_payloads() {
    let (addr, _) = spawn_upstream().await;
    let request = GraphQueryRequest::new(Endpoint::GraphAndAdvice).with_body("text", "a");

    let response = client(addr, "api").send(&request).await.expect("request succeeds");
    assert_eq!(response.ai_advice, Some(vec![json!("What connects a and b?")]));
}

#[tokio::test]
async fn non_success_status_is_a_remote_error() {
    let (addr, _) = spawn_upstream().await;
    let request = GraphQueryRequest::new(Endpoint::Search).with_body("query", "a");

    let err = client(addr, "api").send(&request).await.unwrap_err();
    match err {
        NodusError::RemoteApi { status, body } => {
            assert_eq!(status, Some(401));
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_is_a_remote_error() {
    let (addr, _) = spawn_upstream().await;
    let request = GraphQueryRequest::new(Endpoint::Search).with_body("query", "a");

    let err = client(addr, "slow").send(&request).await.unwrap_err();
    match err {
        NodusError::RemoteApi { status, body } => {
            assert_eq!(status, None);
            assert!(body.contains("timed out"), "{body}");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}
