use infranodus_core::ToolCall;
use infranodus_core::tools::params::{
    AnalyzeExistingGraphParams,
    CreateKnowledgeGraphParams,
    ResearchQuestionsFromGraphParams,
    ResponsesFromGraphParams,
};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    tool,
    tool_router,
};

use crate::InfraNodusMcp;

#[tool_router(router = tool_router_graphs, vis = "pub")]
impl InfraNodusMcp {
    #[tool(
        name = "createKnowledgeGraph",
        description = "Create a knowledge graph in InfraNodus from text and provide a link to it"
    )]
    async fn create_knowledge_graph(
        &self,
        Parameters(params): Parameters<CreateKnowledgeGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::CreateKnowledgeGraph(params)).await)
    }

    #[tool(
        name = "analyzeExistingGraphByName",
        description = "Retrieve and analyze an existing graph from your InfraNodus account"
    )]
    async fn analyze_existing_graph_by_name(
        &self,
        Parameters(params): Parameters<AnalyzeExistingGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::AnalyzeExistingGraph(params)).await)
    }

    #[tool(
        name = "generateResearchQuestionsFromGraph",
        description = "Retrieve an InfraNodus graph and generate research questions based on the content gaps identified"
    )]
    async fn generate_research_questions_from_graph(
        &self,
        Parameters(params): Parameters<ResearchQuestionsFromGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::ResearchQuestionsFromGraph(params)).await)
    }

    #[tool(
        name = "generateResponsesFromGraph",
        description = "Retrieve an InfraNodus graph and generate responses and expert advice based on a prompt provided"
    )]
    async fn generate_responses_from_graph(
        &self,
        Parameters(params): Parameters<ResponsesFromGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::ResponsesFromGraph(params)).await)
    }
}
