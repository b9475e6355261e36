//! MCP server implementation for infranodus-mcp.
//!
//! Each catalog entry from `infranodus-core` is registered as an rmcp tool.
//! Handlers stay thin: they wrap their parameters in a [`ToolCall`] and hand it
//! to the shared dispatch path.

mod helpers;
mod progress;
mod resources;
mod tools;
pub mod server;

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use infranodus_core::stream::progress_stream;
use infranodus_core::tools::finish;
use infranodus_core::{GraphGateway, NodusError, StreamEvent, StreamRegistry, ToolCall, execute};
use rmcp::model::{
    CallToolResult,
    Content,
    ErrorCode,
    Implementation,
    ListResourcesResult,
    PaginatedRequestParams,
    ReadResourceRequestParams,
    ReadResourceResult,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use tracing::debug;
use uuid::Uuid;

use crate::progress::McpProgress;

pub use resources::ABOUT_URI;

const SERVER_INSTRUCTIONS: &str = r#"infranodus-mcp exposes InfraNodus text network analysis as MCP tools.

Workflow:
1. For ad-hoc text, start with `generateKnowledgeGraph`. It returns graph statistics, main
   topical clusters, concepts, and content gaps without saving anything.
2. For narrower answers use `generateContentGaps`, `generateTopicalClusters`,
   `generateTextOverview`, or `generateInsights`.
3. To explore what a text is missing, use `generateResearchQuestions`
   (`generateResearchQuestionsStreaming` reports progress while it runs).
4. For graphs saved in the InfraNodus account:
   - `createKnowledgeGraph` saves text into a named graph and returns its link.
   - `analyzeExistingGraphByName`, `generateResearchQuestionsFromGraph`,
     `generateResponsesFromGraph` work on an existing graph by name.
   - `search` finds concepts across graphs; pass a result id to `fetch` for the matching text.

Notes:
- Search result ids have the form `user:graph:query`.
- Failures come back as `{ "error": "..." }` with `isError` set.
- `info://about` describes the server; `health` returns `ok`."#;

/// MCP server wrapper around a graph gateway and the tool routers.
#[derive(Clone)]
pub struct InfraNodusMcp {
    tool_router: ToolRouter<Self>,
    gateway: Arc<dyn GraphGateway>,
    streams: StreamRegistry,
}

impl InfraNodusMcp {
    /// Creates a server with its own stream registry.
    #[must_use]
    pub fn new(gateway: Arc<dyn GraphGateway>) -> Self {
        Self::with_streams(gateway, StreamRegistry::new())
    }

    /// Creates a server sharing `streams` with other surfaces in the process.
    #[must_use]
    pub fn with_streams(gateway: Arc<dyn GraphGateway>, streams: StreamRegistry) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_analysis()
            + Self::tool_router_graphs()
            + Self::tool_router_search();
        Self {
            tool_router,
            gateway,
            streams,
        }
    }

    pub(crate) async fn run(&self, call: ToolCall) -> CallToolResult {
        let outcome = execute(self.gateway.as_ref(), &call).await;
        helpers::tool_result(call.name(), outcome)
    }

    /// Runs `call` through the progress stream, forwarding checkpoints to `progress`.
    ///
    /// When `cancelled` resolves the stream is cancelled and stops at its next
    /// checkpoint.
    pub(crate) async fn run_streaming(
        &self,
        call: ToolCall,
        progress: Option<McpProgress>,
        cancelled: impl Future<Output = ()> + Send,
    ) -> CallToolResult {
        let tool = call.name();
        let stream_id = format!("research-{}", Uuid::new_v4());
        let session = match self.streams.register(stream_id.clone()) {
            Ok(session) => session,
            Err(err) => return helpers::tool_result(tool, Err(err)),
        };
        debug!(%tool, %stream_id, "streamed call started");

        let mut cancelled = pin!(cancelled);
        let mut cancel_requested = false;
        let mut events = pin!(progress_stream(
            Arc::clone(&self.gateway),
            call.clone(),
            session,
        ));
        let mut response = None;
        loop {
            let event = tokio::select! {
                biased;
                () = &mut cancelled, if !cancel_requested => {
                    cancel_requested = true;
                    self.streams.cancel(&stream_id);
                    continue;
                }
                event = events.next() => event,
            };
            let Some(event) = event else { break };

            if let (Some(progress), StreamEvent::Message(update)) = (progress.as_ref(), &event) {
                progress.report(update).await;
            }
            match event {
                StreamEvent::Message(_) => {
                    if let Some(data) = event.into_response() {
                        response = Some(data);
                    }
                }
                StreamEvent::Complete { cancelled: true, .. } => {
                    debug!(%tool, %stream_id, "streamed call cancelled");
                    return helpers::error_result("stream was cancelled");
                }
                StreamEvent::Complete { .. } => break,
                StreamEvent::Error { error, .. } => return helpers::error_result(&error),
            }
        }

        let outcome = response
            .ok_or_else(|| NodusError::Decode("stream ended without a response".to_string()))
            .and_then(|response| finish(&call, response));
        helpers::tool_result(tool, outcome)
    }

    #[must_use]
    pub const fn streams(&self) -> &StreamRegistry {
        &self.streams
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl InfraNodusMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for InfraNodusMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("InfraNodus MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: Some("https://infranodus.com".to_string()),
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: vec![resources::about_resource()],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        if request.uri != ABOUT_URI {
            return Err(helpers::mcp_err(
                ErrorCode::RESOURCE_NOT_FOUND,
                format!("unknown resource: {}", request.uri),
            ));
        }
        Ok(ReadResourceResult {
            contents: vec![resources::about_contents()],
        })
    }
}
