//! Attached SSE clients keyed by stream id.

use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

const CLIENT_BUFFER: usize = 32;

type Senders = HashMap<String, mpsc::Sender<Event>>;

/// Registry of open SSE connections.
///
/// Each id maps to at most one client; attaching again replaces the previous one.
#[derive(Debug, Clone, Default)]
pub struct SseClients {
    inner: Arc<Mutex<Senders>>,
}

impl SseClients {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Senders> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches a client under `id` and returns its event stream.
    ///
    /// The entry is removed when the returned stream is dropped.
    #[must_use]
    pub fn attach(&self, id: &str) -> ClientStream {
        let (sender, receiver) = mpsc::channel(CLIENT_BUFFER);
        if self.lock().insert(id.to_string(), sender.clone()).is_some() {
            debug!(stream_id = id, "replaced existing SSE client");
        }
        ClientStream {
            events: ReceiverStream::new(receiver),
            _detach: Detach {
                clients: self.clone(),
                id: id.to_string(),
                sender,
            },
        }
    }

    /// Sends `payload` as a named event to the client attached under `id`.
    ///
    /// Returns `false` when no client is attached or it has gone away.
    pub async fn send(&self, id: &str, name: &str, payload: &Value) -> bool {
        let Some(sender) = self.lock().get(id).cloned() else {
            return false;
        };
        let event = Event::default().event(name).data(payload.to_string());
        sender.send(event).await.is_ok()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Event stream for one attached client.
pub struct ClientStream {
    events: ReceiverStream<Event>,
    _detach: Detach,
}

impl Stream for ClientStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx).map(|event| event.map(Ok))
    }
}

struct Detach {
    clients: SseClients,
    id: String,
    sender: mpsc::Sender<Event>,
}

impl Drop for Detach {
    fn drop(&mut self) {
        let mut senders = self.clients.lock();
        // A newer client may have taken over the id.
        if senders
            .get(&self.id)
            .is_some_and(|current| current.same_channel(&self.sender))
        {
            senders.remove(&self.id);
            debug!(stream_id = %self.id, "SSE client disconnected");
        }
    }
}
