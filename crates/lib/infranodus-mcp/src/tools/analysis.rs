use infranodus_core::ToolCall;
use infranodus_core::tools::params::{
    GenerateKnowledgeGraphParams,
    InsightsParams,
    ResearchQuestionsParams,
    TextParams,
};
use rmcp::{
    ErrorData,
    RoleServer,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    service::RequestContext,
    tool,
    tool_router,
};

use crate::InfraNodusMcp;
use crate::progress::McpProgress;

#[tool_router(router = tool_router_analysis, vis = "pub")]
impl InfraNodusMcp {
    #[tool(
        name = "generateKnowledgeGraph",
        description = "Analyze text and generate a knowledge graph with topics, concepts, and structural gaps"
    )]
    async fn generate_knowledge_graph(
        &self,
        Parameters(params): Parameters<GenerateKnowledgeGraphParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::GenerateKnowledgeGraph(params)).await)
    }

    #[tool(
        name = "generateContentGaps",
        description = "Generate content gaps from text using knowledge graph analysis"
    )]
    async fn generate_content_gaps(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::ContentGaps(params)).await)
    }

    #[tool(
        name = "generateTopicalClusters",
        description = "Generate topics and clusters of keywords from text using knowledge graph analysis"
    )]
    async fn generate_topical_clusters(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::TopicalClusters(params)).await)
    }

    #[tool(
        name = "generateTextOverview",
        description = "Generate a topical overview of a text and provide insights for LLMs to generate better responses"
    )]
    async fn generate_text_overview(
        &self,
        Parameters(params): Parameters<TextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::TextOverview(params)).await)
    }

    #[tool(
        name = "generateInsights",
        description = "Summarize the main topics, gaps, and open questions of a text using knowledge graph analysis"
    )]
    async fn generate_insights(
        &self,
        Parameters(params): Parameters<InsightsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::Insights(params)).await)
    }

    #[tool(
        name = "generateResearchQuestions",
        description = "Analyze text and generate research questions based on the content gaps identified"
    )]
    async fn generate_research_questions(
        &self,
        Parameters(params): Parameters<ResearchQuestionsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.run(ToolCall::ResearchQuestions(params)).await)
    }

    /// Same request as `generateResearchQuestions`, with progress notifications
    /// sent to callers that supplied a progress token. Cancelling the request
    /// cancels the stream.
    #[tool(
        name = "generateResearchQuestionsStreaming",
        description = "Analyze text and generate research questions, reporting progress while the analysis runs"
    )]
    async fn generate_research_questions_streaming(
        &self,
        Parameters(params): Parameters<ResearchQuestionsParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = McpProgress::from_request(&context.meta, context.peer);
        Ok(self
            .run_streaming(
                ToolCall::ResearchQuestionsStreaming(params),
                progress,
                context.ct.cancelled_owned(),
            )
            .await)
    }
}
