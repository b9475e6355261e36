//! REST and SSE surface for infranodus-mcp.
//!
//! The routes are thin wrappers around the same dispatch path the MCP tools
//! use. `/api/analyze` runs research-question generation through the progress
//! stream and mirrors each checkpoint to the SSE client attached under the
//! same stream id.

pub mod error;
pub mod routes;
pub mod sse;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use infranodus_core::{GraphGateway, StreamRegistry};
use tower_http::cors::CorsLayer;
use tracing::info;

pub use error::ApiError;
pub use sse::SseClients;

/// Port used by the REST/SSE surface when none is configured.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<dyn GraphGateway>,
    streams: StreamRegistry,
    clients: SseClients,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: Arc<dyn GraphGateway>, streams: StreamRegistry) -> Self {
        Self {
            gateway,
            streams,
            clients: SseClients::new(),
        }
    }

    #[must_use]
    pub const fn streams(&self) -> &StreamRegistry {
        &self.streams
    }

    #[must_use]
    pub const fn clients(&self) -> &SseClients {
        &self.clients
    }
}

/// Builds the REST/SSE router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/sse/stream/:id",
            get(routes::attach_stream).delete(routes::cancel_stream),
        )
        .route("/api/analyze", post(routes::analyze))
        .route("/api/command", post(routes::command))
        .route("/api/tools", get(routes::tools))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the REST/SSE surface on `addr`.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "REST/SSE surface listening");
    axum::serve(listener, app).await?;
    Ok(())
}
