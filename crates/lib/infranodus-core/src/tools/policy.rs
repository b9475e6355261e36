//! Request-building policy for each catalog entry.
//!
//! Query flags are literal and ordered the same way for every call of a tool so
//! that upstream caching and request logs stay comparable.

use crate::error::ValidationError;
use crate::request::{Endpoint, GraphQueryRequest};
use crate::tools::params::{
    AnalyzeExistingGraphParams,
    CreateKnowledgeGraphParams,
    FetchId,
    GenerateKnowledgeGraphParams,
    InsightsParams,
    ResearchQuestionsFromGraphParams,
    ResearchQuestionsParams,
    ResponsesFromGraphParams,
    SearchParams,
    TextParams,
};

/// `aiTopics` travels in the body as a string, not a JSON boolean.
const AI_TOPICS: &str = "true";

pub fn generate_knowledge_graph(params: &GenerateKnowledgeGraphParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("includeStatements", params.include_statements)
        .with_query("includeGraphSummary", false)
        .with_query("extendedGraphSummary", true)
        .with_query("includeGraph", params.include_graph)
        .with_query("aiTopics", true)
        .with_query("optimize", "develop")
        .with_body("text", params.text.as_str())
        .with_body("aiTopics", AI_TOPICS)
        .with_optional_body(
            "modifyAnalyzedText",
            params.modify_analyzed_text.as_request_value(),
        )
}

pub fn create_knowledge_graph(params: &CreateKnowledgeGraphParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", false)
        .with_query("addStats", true)
        .with_query("includeStatements", params.include_statements)
        .with_query("includeGraphSummary", false)
        .with_query("extendedGraphSummary", true)
        .with_query("includeGraph", true)
        .with_query("aiTopics", true)
        .with_query("optimize", "develop")
        .with_body("name", params.graph_name.as_str())
        .with_body("text", params.text.as_str())
        .with_body("aiTopics", AI_TOPICS)
        .with_optional_body(
            "modifyAnalyzedText",
            params.modify_analyzed_text.as_request_value(),
        )
}

pub fn analyze_existing_graph(params: &AnalyzeExistingGraphParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("includeStatements", params.include_statements)
        .with_query("includeGraphSummary", params.include_graph_summary)
        .with_query("extendedGraphSummary", true)
        .with_query("includeGraph", params.include_graph)
        .with_query("aiTopics", true)
        .with_query("optimize", "develop")
        .with_body("name", params.graph_name.as_str())
        .with_body("aiTopics", AI_TOPICS)
}

/// Shared by `generateContentGaps` and `generateTopicalClusters`.
pub fn extended_summary(params: &TextParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("includeGraphSummary", false)
        .with_query("extendedGraphSummary", true)
        .with_query("includeGraph", false)
        .with_query("includeStatements", false)
        .with_query("aiTopics", true)
        .with_body("text", params.text.as_str())
}

pub fn text_overview(params: &TextParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("includeGraphSummary", true)
        .with_query("extendedGraphSummary", false)
        .with_query("includeGraph", false)
        .with_query("includeStatements", false)
        .with_query("aiTopics", true)
        .with_body("text", params.text.as_str())
}

pub fn insights(params: &InsightsParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::GraphAndStatements)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("includeStatements", true)
        .with_query("includeGraphSummary", true)
        .with_query("extendedGraphSummary", false)
        .with_query("includeGraph", true)
        .with_query("aiTopics", true)
        .with_body("text", params.text.as_str())
        .with_body("aiTopics", AI_TOPICS)
}

fn advice_request(
    use_several_gaps: Option<bool>,
    gap_depth: Option<u32>,
) -> GraphQueryRequest {
    let request = GraphQueryRequest::new(Endpoint::GraphAndAdvice)
        .with_query("doNotSave", true)
        .with_query("addStats", true)
        .with_query("optimize", "gap")
        .with_query("includeStatements", false)
        .with_query("includeGraphSummary", false)
        .with_query("extendedGraphSummary", false)
        .with_query("includeGraph", false)
        .with_query("aiTopics", true);
    match (use_several_gaps, gap_depth) {
        (Some(several), Some(depth)) => request
            .with_query("extendedAdvice", several)
            .with_query("gapDepth", depth),
        _ => request,
    }
}

pub fn research_questions(params: &ResearchQuestionsParams) -> GraphQueryRequest {
    advice_request(Some(params.use_several_gaps), Some(params.gap_depth))
        .with_body("text", params.text.as_str())
        .with_body("aiTopics", AI_TOPICS)
        .with_body("requestMode", "question")
        .with_body("modelToUse", params.model_to_use.as_str())
}

pub fn research_questions_from_graph(
    params: &ResearchQuestionsFromGraphParams,
) -> GraphQueryRequest {
    advice_request(Some(params.use_several_gaps), Some(params.gap_depth))
        .with_body("name", params.graph_name.as_str())
        .with_body("aiTopics", AI_TOPICS)
        .with_body("requestMode", "question")
        .with_body("modelToUse", params.model_to_use.as_str())
}

pub fn responses_from_graph(params: &ResponsesFromGraphParams) -> GraphQueryRequest {
    advice_request(None, None)
        .with_body("name", params.graph_name.as_str())
        .with_body("aiTopics", AI_TOPICS)
        .with_body("requestMode", "response")
        .with_body("prompt", params.prompt.as_deref().unwrap_or_default())
        .with_body("modelToUse", params.model_to_use.as_str())
}

pub fn search(params: &SearchParams) -> GraphQueryRequest {
    GraphQueryRequest::new(Endpoint::Search)
        .with_body("query", params.query.as_str())
        .with_body("contextNames", params.context_names.join(","))
}

/// # Errors
/// Returns `ValidationError::MalformedId` when `id` has fewer than two segments.
pub fn fetch(id: &str) -> Result<GraphQueryRequest, ValidationError> {
    let FetchId {
        user_name,
        graph_name,
        query,
    } = FetchId::parse(id)?;
    Ok(GraphQueryRequest::new(Endpoint::Search)
        .with_body("query", query)
        .with_body("contextNames", graph_name)
        .with_body("userName", user_name))
}
