//! Progress streaming with cooperative cancellation.
//!
//! A stream runs one tool call and reports fixed checkpoints around the single
//! gateway request. Each stream owns a liveness flag in a shared
//! [`StreamRegistry`]; cancelling flips the flag and the stream stops at its
//! next checkpoint, always ending with a terminal event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_stream::stream;
use futures::Stream;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{NodusError, NodusResult};
use crate::gateway::GraphGateway;
use crate::model::GraphResponse;
use crate::tools::ToolCall;

type Flags = HashMap<String, Arc<AtomicBool>>;

/// Shared map of stream id to liveness flag.
#[derive(Debug, Clone, Default)]
pub struct StreamRegistry {
    inner: Arc<Mutex<Flags>>,
}

impl StreamRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `id` for a new stream. The entry is released when the returned
    /// session is dropped.
    ///
    /// # Errors
    /// Returns `NodusError::StreamConflict` if a live session already holds `id`.
    pub fn register(&self, id: impl Into<String>) -> NodusResult<StreamSession> {
        let id = id.into();
        let active = Arc::new(AtomicBool::new(true));
        {
            let mut flags = self.flags();
            if flags.contains_key(&id) {
                return Err(NodusError::StreamConflict(id));
            }
            flags.insert(id.clone(), Arc::clone(&active));
        }
        debug!(stream_id = %id, "stream registered");
        Ok(StreamSession {
            id,
            active,
            registry: self.clone(),
        })
    }

    /// Marks `id` inactive. Returns `false` if no such stream is registered.
    ///
    /// Cancellation is one-way; a cancelled stream never becomes active again.
    pub fn cancel(&self, id: &str) -> bool {
        match self.flags().get(id) {
            Some(flag) => {
                flag.store(false, Ordering::SeqCst);
                debug!(stream_id = %id, "stream cancelled");
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.flags()
            .get(id)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flags().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }

    fn release(&self, id: &str, active: &Arc<AtomicBool>) {
        let mut flags = self.flags();
        if flags.get(id).is_some_and(|flag| Arc::ptr_eq(flag, active)) {
            flags.remove(id);
        }
    }
}

/// Registry entry for one running stream.
#[derive(Debug)]
pub struct StreamSession {
    id: String,
    active: Arc<AtomicBool>,
    registry: StreamRegistry,
}

impl StreamSession {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.registry.release(&self.id, &self.active);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Starting,
    Processing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub status: ProgressStatus,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Raw upstream response; only set on the `complete` checkpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<GraphResponse>>,
}

impl ProgressUpdate {
    const fn checkpoint(status: ProgressStatus, message: &'static str, progress: Option<u8>) -> Self {
        Self {
            status,
            message,
            progress,
            data: None,
        }
    }
}

const BEFORE_REQUEST: [(ProgressStatus, &str, Option<u8>); 4] = [
    (ProgressStatus::Starting, "Initializing analysis...", None),
    (ProgressStatus::Processing, "Analyzing text content...", Some(25)),
    (ProgressStatus::Processing, "Building knowledge graph...", Some(50)),
    (ProgressStatus::Processing, "Sending request to InfraNodus...", Some(75)),
];

/// Events produced by [`progress_stream`]. `Complete` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Message(ProgressUpdate),
    Complete { stream_id: String, cancelled: bool },
    Error { stream_id: String, error: String },
}

impl StreamEvent {
    /// SSE event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Message(_))
    }

    /// JSON body carried by the event.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Message(update) => serde_json::to_value(update).unwrap_or(Value::Null),
            Self::Complete {
                stream_id,
                cancelled,
            } => json!({ "streamId": stream_id, "cancelled": cancelled }),
            Self::Error { error, .. } => json!({ "error": error }),
        }
    }

    /// Takes the raw response out of a `complete` checkpoint.
    #[must_use]
    pub fn into_response(self) -> Option<GraphResponse> {
        match self {
            Self::Message(ProgressUpdate {
                status: ProgressStatus::Complete,
                data: Some(data),
                ..
            }) => Some(*data),
            _ => None,
        }
    }
}

fn cancelled(stream_id: &str) -> StreamEvent {
    debug!(%stream_id, "stream stopped after cancellation");
    StreamEvent::Complete {
        stream_id: stream_id.to_string(),
        cancelled: true,
    }
}

/// Runs `call` as a checkpointed stream bound to `session`.
///
/// Yields `starting`, `processing` at 25, 50 and 75, performs the one gateway
/// request, then `processing` at 90 and `complete` at 100 carrying the raw
/// response, followed by a terminal [`StreamEvent::Complete`]. A failed request
/// or a payload carrying an upstream `error` ends the stream with
/// [`StreamEvent::Error`] instead. The session is released from its registry
/// when the stream is dropped.
pub fn progress_stream(
    gateway: Arc<dyn GraphGateway>,
    call: ToolCall,
    session: StreamSession,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    stream! {
        let stream_id = session.id().to_string();

        let request = match call.build_request() {
            Ok(request) => request,
            Err(err) => {
                yield StreamEvent::Error { stream_id, error: err.to_string() };
                return;
            }
        };

        for (status, message, progress) in BEFORE_REQUEST {
            if !session.is_active() {
                yield cancelled(&stream_id);
                return;
            }
            yield StreamEvent::Message(ProgressUpdate::checkpoint(status, message, progress));
        }

        let response = match gateway.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%stream_id, tool = %call.name(), error = %err, "streamed request failed");
                yield StreamEvent::Error { stream_id, error: err.to_string() };
                return;
            }
        };

        if let Some(message) = response.upstream_error() {
            warn!(%stream_id, tool = %call.name(), "upstream reported an error");
            let error = NodusError::UpstreamDomain(message.to_string()).to_string();
            yield StreamEvent::Error { stream_id, error };
            return;
        }

        if !session.is_active() {
            yield cancelled(&stream_id);
            return;
        }
        yield StreamEvent::Message(ProgressUpdate::checkpoint(
            ProgressStatus::Processing,
            "Processing results...",
            Some(90),
        ));

        if !session.is_active() {
            yield cancelled(&stream_id);
            return;
        }
        yield StreamEvent::Message(ProgressUpdate {
            status: ProgressStatus::Complete,
            message: "Analysis complete",
            progress: Some(100),
            data: Some(Box::new(response)),
        });

        yield StreamEvent::Complete { stream_id, cancelled: false };
    }
}
