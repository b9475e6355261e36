//! The tool catalog: names, inputs, request policy, and output projection.

pub mod params;
pub mod policy;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{NodusError, NodusResult, ValidationError};
use crate::gateway::GraphGateway;
use crate::model::GraphResponse;
use crate::request::GraphQueryRequest;
use crate::transform::{
    self,
    FetchOutput,
    GapsOutput,
    GraphProjection,
    InsightsOutput,
    KnowledgeGraphOutput,
    ResearchQuestionsOutput,
    ResponsesOutput,
    SearchOutput,
    TextOverviewOutput,
    TopicsOutput,
};
use params::{
    AnalyzeExistingGraphParams,
    CreateKnowledgeGraphParams,
    FetchId,
    FetchParams,
    GenerateKnowledgeGraphParams,
    InsightsParams,
    ResearchQuestionsFromGraphParams,
    ResearchQuestionsParams,
    ResponsesFromGraphParams,
    SearchParams,
    TextParams,
    Validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolName {
    #[serde(rename = "generateKnowledgeGraph")]
    GenerateKnowledgeGraph,
    #[serde(rename = "createKnowledgeGraph")]
    CreateKnowledgeGraph,
    #[serde(rename = "analyzeExistingGraphByName")]
    AnalyzeExistingGraphByName,
    #[serde(rename = "generateContentGaps")]
    GenerateContentGaps,
    #[serde(rename = "generateTopicalClusters")]
    GenerateTopicalClusters,
    #[serde(rename = "generateTextOverview")]
    GenerateTextOverview,
    #[serde(rename = "generateInsights")]
    GenerateInsights,
    #[serde(rename = "generateResearchQuestions")]
    GenerateResearchQuestions,
    #[serde(rename = "generateResearchQuestionsFromGraph")]
    GenerateResearchQuestionsFromGraph,
    #[serde(rename = "generateResearchQuestionsStreaming")]
    GenerateResearchQuestionsStreaming,
    #[serde(rename = "generateResponsesFromGraph")]
    GenerateResponsesFromGraph,
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "fetch")]
    Fetch,
}

impl ToolName {
    pub const ALL: [Self; 13] = [
        Self::GenerateKnowledgeGraph,
        Self::CreateKnowledgeGraph,
        Self::AnalyzeExistingGraphByName,
        Self::GenerateContentGaps,
        Self::GenerateTopicalClusters,
        Self::GenerateTextOverview,
        Self::GenerateInsights,
        Self::GenerateResearchQuestions,
        Self::GenerateResearchQuestionsFromGraph,
        Self::GenerateResearchQuestionsStreaming,
        Self::GenerateResponsesFromGraph,
        Self::Search,
        Self::Fetch,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GenerateKnowledgeGraph => "generateKnowledgeGraph",
            Self::CreateKnowledgeGraph => "createKnowledgeGraph",
            Self::AnalyzeExistingGraphByName => "analyzeExistingGraphByName",
            Self::GenerateContentGaps => "generateContentGaps",
            Self::GenerateTopicalClusters => "generateTopicalClusters",
            Self::GenerateTextOverview => "generateTextOverview",
            Self::GenerateInsights => "generateInsights",
            Self::GenerateResearchQuestions => "generateResearchQuestions",
            Self::GenerateResearchQuestionsFromGraph => "generateResearchQuestionsFromGraph",
            Self::GenerateResearchQuestionsStreaming => "generateResearchQuestionsStreaming",
            Self::GenerateResponsesFromGraph => "generateResponsesFromGraph",
            Self::Search => "search",
            Self::Fetch => "fetch",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::GenerateKnowledgeGraph => "Generate Knowledge Graph from Text",
            Self::CreateKnowledgeGraph => "Create a Knowledge Graph in InfraNodus from Text",
            Self::AnalyzeExistingGraphByName => "Analyze Existing InfraNodus Graph",
            Self::GenerateContentGaps => "Generate Content Gaps",
            Self::GenerateTopicalClusters => "Generate Topical Clusters",
            Self::GenerateTextOverview => "Generate an Overview of a Text",
            Self::GenerateInsights => "Generate Insights from Text",
            Self::GenerateResearchQuestions => "Generate Research Questions from Text",
            Self::GenerateResearchQuestionsFromGraph => {
                "Generate Research Questions from an InfraNodus Graph"
            }
            Self::GenerateResearchQuestionsStreaming => {
                "Generate Research Questions with Streaming"
            }
            Self::GenerateResponsesFromGraph => {
                "Generate Responses and Expert Advice from an InfraNodus Graph"
            }
            Self::Search => "Search through Existing InfraNodus Graphs",
            Self::Fetch => "Fetch a Search Result",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GenerateKnowledgeGraph => {
                "Analyze text and generate a knowledge graph with topics, concepts, and structural gaps"
            }
            Self::CreateKnowledgeGraph => {
                "Create a knowledge graph in InfraNodus from text and provide a link to it"
            }
            Self::AnalyzeExistingGraphByName => {
                "Retrieve and analyze an existing graph from your InfraNodus account"
            }
            Self::GenerateContentGaps => {
                "Generate content gaps from text using knowledge graph analysis"
            }
            Self::GenerateTopicalClusters => {
                "Generate topics and clusters of keywords from text using knowledge graph analysis"
            }
            Self::GenerateTextOverview => {
                "Generate a topical overview of a text and provide insights for LLMs to generate better responses"
            }
            Self::GenerateInsights => {
                "Summarize the main topics, gaps, and open questions of a text using knowledge graph analysis"
            }
            Self::GenerateResearchQuestions => {
                "Analyze text and generate research questions based on the content gaps identified"
            }
            Self::GenerateResearchQuestionsFromGraph => {
                "Retrieve an InfraNodus graph and generate research questions based on the content gaps identified"
            }
            Self::GenerateResearchQuestionsStreaming => {
                "Analyze text and generate research questions, reporting progress while the analysis runs"
            }
            Self::GenerateResponsesFromGraph => {
                "Retrieve an InfraNodus graph and generate responses and expert advice based on a prompt provided"
            }
            Self::Search => "Find the concepts and terms in existing InfraNodus graphs",
            Self::Fetch => "Fetch a specific search result for a graph",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ValidationError;

    /// Accepts canonical names plus the snake_case and short names older
    /// clients were built against.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if let Some(tool) = Self::ALL.into_iter().find(|tool| tool.as_str() == name) {
            return Ok(tool);
        }
        match name {
            "generate_knowledge_graph" => Ok(Self::GenerateKnowledgeGraph),
            "create_knowledge_graph" => Ok(Self::CreateKnowledgeGraph),
            "analyzeExistingGraph" | "analyze_existing_graph" => {
                Ok(Self::AnalyzeExistingGraphByName)
            }
            "generate_content_gaps" => Ok(Self::GenerateContentGaps),
            "generate_topical_clusters" => Ok(Self::GenerateTopicalClusters),
            "generate_text_overview" => Ok(Self::GenerateTextOverview),
            "generate_insights" => Ok(Self::GenerateInsights),
            "generate_research_questions" => Ok(Self::GenerateResearchQuestions),
            "generate_research_questions_from_graph" => {
                Ok(Self::GenerateResearchQuestionsFromGraph)
            }
            "generate_responses_from_graph" => Ok(Self::GenerateResponsesFromGraph),
            _ => Err(ValidationError::UnknownTool(name.to_string())),
        }
    }
}

/// A validated-shape invocation of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    GenerateKnowledgeGraph(GenerateKnowledgeGraphParams),
    CreateKnowledgeGraph(CreateKnowledgeGraphParams),
    AnalyzeExistingGraph(AnalyzeExistingGraphParams),
    ContentGaps(TextParams),
    TopicalClusters(TextParams),
    TextOverview(TextParams),
    Insights(InsightsParams),
    ResearchQuestions(ResearchQuestionsParams),
    ResearchQuestionsFromGraph(ResearchQuestionsFromGraphParams),
    ResearchQuestionsStreaming(ResearchQuestionsParams),
    ResponsesFromGraph(ResponsesFromGraphParams),
    Search(SearchParams),
    Fetch(FetchParams),
}

impl ToolCall {
    /// Resolves `name` and decodes `arguments` into that tool's input, applying defaults.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownTool` for names outside the catalog and
    /// `ValidationError::InvalidField` when `arguments` does not fit the input schema.
    pub fn from_arguments(name: &str, arguments: Value) -> Result<Self, ValidationError> {
        let tool = name.parse::<ToolName>()?;
        let arguments = match arguments {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        let call = match tool {
            ToolName::GenerateKnowledgeGraph => Self::GenerateKnowledgeGraph(decode(arguments)?),
            ToolName::CreateKnowledgeGraph => Self::CreateKnowledgeGraph(decode(arguments)?),
            ToolName::AnalyzeExistingGraphByName => Self::AnalyzeExistingGraph(decode(arguments)?),
            ToolName::GenerateContentGaps => Self::ContentGaps(decode(arguments)?),
            ToolName::GenerateTopicalClusters => Self::TopicalClusters(decode(arguments)?),
            ToolName::GenerateTextOverview => Self::TextOverview(decode(arguments)?),
            ToolName::GenerateInsights => Self::Insights(decode(arguments)?),
            ToolName::GenerateResearchQuestions => Self::ResearchQuestions(decode(arguments)?),
            ToolName::GenerateResearchQuestionsFromGraph => {
                Self::ResearchQuestionsFromGraph(decode(arguments)?)
            }
            ToolName::GenerateResearchQuestionsStreaming => {
                Self::ResearchQuestionsStreaming(decode(arguments)?)
            }
            ToolName::GenerateResponsesFromGraph => Self::ResponsesFromGraph(decode(arguments)?),
            ToolName::Search => Self::Search(decode(arguments)?),
            ToolName::Fetch => Self::Fetch(decode(arguments)?),
        };
        Ok(call)
    }

    #[must_use]
    pub const fn name(&self) -> ToolName {
        match self {
            Self::GenerateKnowledgeGraph(_) => ToolName::GenerateKnowledgeGraph,
            Self::CreateKnowledgeGraph(_) => ToolName::CreateKnowledgeGraph,
            Self::AnalyzeExistingGraph(_) => ToolName::AnalyzeExistingGraphByName,
            Self::ContentGaps(_) => ToolName::GenerateContentGaps,
            Self::TopicalClusters(_) => ToolName::GenerateTopicalClusters,
            Self::TextOverview(_) => ToolName::GenerateTextOverview,
            Self::Insights(_) => ToolName::GenerateInsights,
            Self::ResearchQuestions(_) => ToolName::GenerateResearchQuestions,
            Self::ResearchQuestionsFromGraph(_) => ToolName::GenerateResearchQuestionsFromGraph,
            Self::ResearchQuestionsStreaming(_) => ToolName::GenerateResearchQuestionsStreaming,
            Self::ResponsesFromGraph(_) => ToolName::GenerateResponsesFromGraph,
            Self::Search(_) => ToolName::Search,
            Self::Fetch(_) => ToolName::Fetch,
        }
    }

    /// # Errors
    /// Returns the first input constraint that is violated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::GenerateKnowledgeGraph(params) => params.validate(),
            Self::CreateKnowledgeGraph(params) => params.validate(),
            Self::AnalyzeExistingGraph(params) => params.validate(),
            Self::ContentGaps(params) | Self::TopicalClusters(params) | Self::TextOverview(params) => {
                params.validate()
            }
            Self::Insights(params) => params.validate(),
            Self::ResearchQuestions(params) | Self::ResearchQuestionsStreaming(params) => {
                params.validate()
            }
            Self::ResearchQuestionsFromGraph(params) => params.validate(),
            Self::ResponsesFromGraph(params) => params.validate(),
            Self::Search(params) => params.validate(),
            Self::Fetch(params) => params.validate(),
        }
    }

    /// Validates the input and builds the single upstream request for it.
    ///
    /// # Errors
    /// Returns a `ValidationError` when the input is rejected.
    pub fn build_request(&self) -> Result<GraphQueryRequest, ValidationError> {
        self.validate()?;
        let request = match self {
            Self::GenerateKnowledgeGraph(params) => policy::generate_knowledge_graph(params),
            Self::CreateKnowledgeGraph(params) => policy::create_knowledge_graph(params),
            Self::AnalyzeExistingGraph(params) => policy::analyze_existing_graph(params),
            Self::ContentGaps(params) | Self::TopicalClusters(params) => {
                policy::extended_summary(params)
            }
            Self::TextOverview(params) => policy::text_overview(params),
            Self::Insights(params) => policy::insights(params),
            Self::ResearchQuestions(params) | Self::ResearchQuestionsStreaming(params) => {
                policy::research_questions(params)
            }
            Self::ResearchQuestionsFromGraph(params) => {
                policy::research_questions_from_graph(params)
            }
            Self::ResponsesFromGraph(params) => policy::responses_from_graph(params),
            Self::Search(params) => policy::search(params),
            Self::Fetch(params) => policy::fetch(&params.id)?,
        };
        Ok(request)
    }

    /// Projects an upstream response into this tool's output shape.
    ///
    /// # Errors
    /// Only `fetch` can fail here, when its id no longer parses.
    pub fn transform(&self, response: GraphResponse) -> Result<ToolOutput, ValidationError> {
        let output = match self {
            Self::GenerateKnowledgeGraph(params) => ToolOutput::KnowledgeGraph(
                transform::knowledge_graph(
                    response,
                    GraphProjection::new(params.include_graph, params.add_nodes_and_edges),
                ),
            ),
            Self::CreateKnowledgeGraph(_) => ToolOutput::KnowledgeGraph(
                transform::knowledge_graph(response, GraphProjection::new(true, false)),
            ),
            Self::AnalyzeExistingGraph(params) => ToolOutput::KnowledgeGraph(
                transform::knowledge_graph(
                    response,
                    GraphProjection::new(params.include_graph, params.add_nodes_and_edges),
                ),
            ),
            Self::ContentGaps(_) => ToolOutput::Gaps(transform::content_gaps(response)),
            Self::TopicalClusters(_) => ToolOutput::Topics(transform::topical_clusters(response)),
            Self::TextOverview(_) => ToolOutput::TextOverview(transform::text_overview(response)),
            Self::Insights(params) => {
                ToolOutput::Insights(transform::insights(&response, params.insight_type))
            }
            Self::ResearchQuestions(_)
            | Self::ResearchQuestionsFromGraph(_)
            | Self::ResearchQuestionsStreaming(_) => {
                ToolOutput::ResearchQuestions(transform::research_questions(response))
            }
            Self::ResponsesFromGraph(_) => ToolOutput::Responses(transform::responses(response)),
            Self::Search(params) => ToolOutput::Search(transform::search(&response, &params.query)),
            Self::Fetch(params) => {
                let fetch_id = FetchId::parse(&params.id)?;
                ToolOutput::Fetch(transform::fetch(&response, &params.id, &fetch_id))
            }
        };
        Ok(output)
    }
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, ValidationError> {
    serde_json::from_value(arguments).map_err(|err| {
        let message = err.to_string();
        let field = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
            .unwrap_or("arguments")
            .to_string();
        ValidationError::InvalidField { field, message }
    })
}

/// Structured result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    KnowledgeGraph(KnowledgeGraphOutput),
    Gaps(GapsOutput),
    Topics(TopicsOutput),
    TextOverview(TextOverviewOutput),
    Insights(InsightsOutput),
    ResearchQuestions(ResearchQuestionsOutput),
    Responses(ResponsesOutput),
    Search(SearchOutput),
    Fetch(FetchOutput),
}

impl ToolOutput {
    /// # Errors
    /// Returns `NodusError::Decode` if the output cannot be serialized.
    pub fn to_pretty_json(&self) -> NodusResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| NodusError::Decode(err.to_string()))
    }
}

/// Runs one invocation end to end: validate, request, check upstream error, project.
///
/// Nothing reaches the gateway when validation fails.
///
/// # Errors
/// Returns the validation, remote, decode, or upstream-domain failure for this call.
pub async fn execute(gateway: &dyn GraphGateway, call: &ToolCall) -> NodusResult<ToolOutput> {
    let request = call.build_request()?;
    let response = gateway.send(&request).await?;
    finish(call, response)
}

/// Applies the upstream error check and projection to an already-fetched response.
///
/// # Errors
/// Returns `NodusError::UpstreamDomain` when the payload carries an `error` message.
pub fn finish(call: &ToolCall, response: GraphResponse) -> NodusResult<ToolOutput> {
    if let Some(message) = response.upstream_error() {
        debug!(tool = %call.name(), "upstream reported an error");
        return Err(NodusError::UpstreamDomain(message.to_string()));
    }
    Ok(call.transform(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = ToolName::ALL.iter().map(|tool| tool.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ToolName::ALL.len());
    }

    #[test]
    fn names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>(), Ok(tool));
        }
    }

    #[test]
    fn accepts_legacy_names() {
        assert_eq!(
            "generate_knowledge_graph".parse::<ToolName>(),
            Ok(ToolName::GenerateKnowledgeGraph)
        );
        assert_eq!(
            "analyzeExistingGraph".parse::<ToolName>(),
            Ok(ToolName::AnalyzeExistingGraphByName)
        );
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = ToolCall::from_arguments("summarize", json!({})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownTool("summarize".to_string()));
    }

    #[test]
    fn missing_field_is_named() {
        let err = ToolCall::from_arguments("generateContentGaps", Value::Null).unwrap_err();
        assert_eq!(err.field(), "text");
    }

    #[test]
    fn empty_text_never_builds_a_request() {
        let call = ToolCall::from_arguments("generateTextOverview", json!({ "text": "" })).unwrap();
        assert_eq!(
            call.build_request(),
            Err(ValidationError::EmptyField { field: "text" })
        );
    }

    #[test]
    fn upstream_error_becomes_domain_error() {
        let call = ToolCall::from_arguments("generateContentGaps", json!({ "text": "t" })).unwrap();
        let response = GraphResponse {
            error: Some("Graph not found".to_string()),
            ..GraphResponse::default()
        };
        let err = finish(&call, response).unwrap_err();
        assert!(matches!(err, NodusError::UpstreamDomain(ref message) if message == "Graph not found"));
    }
}
