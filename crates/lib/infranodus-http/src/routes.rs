//! REST and SSE handlers.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{KeepAlive, Sse};
use chrono::Utc;
use futures::StreamExt;
use infranodus_core::stream::progress_stream;
use infranodus_core::tools::finish;
use infranodus_core::{NodusError, StreamEvent, ToolCall, ToolName, execute};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::sse::ClientStream;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Body of `POST /api/analyze`.
///
/// `options` accepts the research-question inputs (`useSeveralGaps`, `gapDepth`,
/// `modelToUse`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    pub stream_id: Option<String>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Body of `POST /api/command`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub params: Value,
    pub stream_id: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "sse": { "activeConnections": state.clients.len() },
        "streams": { "active": state.streams.len() },
    }))
}

pub async fn tools() -> Json<Value> {
    let names: Vec<&str> = ToolName::ALL.iter().map(|tool| tool.as_str()).collect();
    Json(json!({ "tools": names }))
}

pub async fn attach_stream(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Sse<ClientStream> {
    let events = state.clients.attach(&stream_id);
    let connected = json!({
        "streamId": stream_id,
        "timestamp": Utc::now().to_rfc3339(),
    });
    state.clients.send(&stream_id, "connected", &connected).await;
    info!(%stream_id, "SSE client connected");

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

pub async fn cancel_stream(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.streams.cancel(&stream_id) {
        return Err(ApiError::UnknownStream(stream_id));
    }
    Ok(Json(json!({ "streamId": stream_id, "cancelled": true })))
}

/// Runs research-question generation through the progress stream, mirroring
/// each checkpoint to the SSE client attached under the stream id.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut arguments = request.options;
    arguments.insert("text".to_string(), Value::String(request.text));
    let call = ToolCall::from_arguments(
        ToolName::GenerateResearchQuestionsStreaming.as_str(),
        Value::Object(arguments),
    )?;
    call.validate()?;

    let stream_id = request
        .stream_id
        .unwrap_or_else(|| format!("analysis-{}", Uuid::new_v4()));
    let session = state.streams.register(stream_id.clone())?;

    let mut events = pin!(progress_stream(
        Arc::clone(&state.gateway),
        call.clone(),
        session,
    ));
    let mut response = None;
    while let Some(event) = events.next().await {
        state
            .clients
            .send(&stream_id, event.name(), &event.payload())
            .await;
        match event {
            StreamEvent::Message(_) => {
                if let Some(data) = event.into_response() {
                    response = Some(data);
                }
            }
            StreamEvent::Complete { cancelled: true, .. } => {
                return Err(ApiError::Cancelled(stream_id));
            }
            StreamEvent::Complete { .. } => break,
            StreamEvent::Error { error, .. } => return Err(ApiError::Stream(error)),
        }
    }

    let result = response
        .ok_or_else(|| NodusError::Decode("stream ended without a response".to_string()))
        .and_then(|response| finish(&call, response))?;
    Ok(Json(json!({ "streamId": stream_id, "result": result })))
}

/// Dispatches any catalog tool by name.
pub async fn command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<Value>, ApiError> {
    let call = ToolCall::from_arguments(&request.command, request.params)?;
    let stream_id = request
        .stream_id
        .unwrap_or_else(|| format!("command-{}", Uuid::new_v4()));
    debug!(tool = %call.name(), %stream_id, "command received");

    let result = execute(state.gateway.as_ref(), &call).await?;
    state
        .clients
        .send(
            &stream_id,
            "complete",
            &json!({ "command": call.name().as_str(), "result": &result }),
        )
        .await;
    Ok(Json(json!({ "streamId": stream_id, "result": result })))
}
