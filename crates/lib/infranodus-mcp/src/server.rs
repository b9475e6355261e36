//! MCP server runners for infranodus-mcp.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use infranodus_core::{GraphGateway, StreamRegistry};
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::InfraNodusMcp;

/// Port used by the MCP streamable HTTP transport when none is configured.
pub const DEFAULT_MCP_HTTP_PORT: u16 = 4020;

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], DEFAULT_MCP_HTTP_PORT)))
    }
}

/// Serves the MCP server over stdio.
///
/// Stdout carries protocol frames only; logging must go to stderr.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(
    gateway: Arc<dyn GraphGateway>,
    streams: StreamRegistry,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = InfraNodusMcp::with_streams(gateway, streams);
    let (stdin, stdout) = stdio();
    let running = serve_server(service, (stdin, stdout)).await?;
    info!("MCP stdio transport ready");
    let _ = running.waiting().await?;
    Ok(())
}

/// Builds the streamable HTTP router: `/mcp` for the protocol, `/health` for probes.
#[must_use]
pub fn streamable_http_router(
    gateway: Arc<dyn GraphGateway>,
    streams: StreamRegistry,
    config: &McpHttpServerConfig,
) -> Router {
    let service: StreamableHttpService<InfraNodusMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(InfraNodusMcp::with_streams(Arc::clone(&gateway), streams.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    gateway: Arc<dyn GraphGateway>,
    streams: StreamRegistry,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = streamable_http_router(gateway, streams, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "MCP streamable HTTP transport listening");
    axum::serve(listener, app).await?;
    Ok(())
}
