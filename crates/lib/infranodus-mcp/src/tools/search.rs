use infranodus_core::ToolCall;
use infranodus_core::tools::params::{FetchParams, SearchParams};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    tool,
    tool_router,
};

use crate::InfraNodusMcp;

#[tool_router(router = tool_router_search, vis = "pub")]
impl InfraNodusMcp {
    #[tool(
        name = "search",
        description = "Find the concepts and terms in existing InfraNodus graphs"
    )]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::Search(params)).await)
    }

    /// Ids come from `search` results and have the form `user:graph:query`.
    #[tool(
        name = "fetch",
        description = "Fetch a specific search result for a graph"
    )]
    async fn fetch(
        &self,
        Parameters(params): Parameters<FetchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::Fetch(params)).await)
    }
}
