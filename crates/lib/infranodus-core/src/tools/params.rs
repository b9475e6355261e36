//! Tool input schemas.
//!
//! Field names are part of the client contract and serialize in camelCase.
//! Defaults are applied during deserialization, so handlers see every field.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Input checks that run after defaults are applied and before any request is built.
pub trait Validate {
    /// # Errors
    /// Returns the first constraint violation, naming the offending field.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

const fn default_true() -> bool {
    true
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Entity detection applied by InfraNodus before building the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ModifyAnalyzedText {
    /// Normal analysis.
    #[default]
    None,
    /// Detect entities and keywords.
    DetectEntities,
    /// Keep only entities.
    ExtractEntitiesOnly,
}

impl ModifyAnalyzedText {
    /// Body value to send, or `None` for the default mode.
    #[must_use]
    pub const fn as_request_value(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::DetectEntities => Some("detectEntities"),
            Self::ExtractEntitiesOnly => Some("extractEntitiesOnly"),
        }
    }
}

/// Which sections `generateInsights` should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    #[default]
    All,
    Summary,
    Topics,
    Gaps,
    Questions,
}

impl InsightType {
    #[must_use]
    pub fn includes(self, section: Self) -> bool {
        self == Self::All || self == section
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKnowledgeGraphParams {
    /// Text that you'd like to analyze.
    #[schemars(length(min = 1))]
    pub text: String,
    /// Include processed statements in the response.
    #[serde(default)]
    pub include_statements: bool,
    /// Entity detection: none (normal), detectEntities (entities and keywords), extractEntitiesOnly (only entities).
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
    /// Include the graph structure (attributes only unless addNodesAndEdges is also set).
    #[serde(default)]
    pub include_graph: bool,
    /// Include raw node and edge arrays in the graph structure.
    #[serde(default)]
    pub add_nodes_and_edges: bool,
}

impl Validate for GenerateKnowledgeGraphParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKnowledgeGraphParams {
    /// Name of the graph to create in your InfraNodus account.
    #[schemars(length(min = 1))]
    pub graph_name: String,
    /// Text to save into the graph.
    #[schemars(length(min = 1))]
    pub text: String,
    /// Include processed statements in the response.
    #[serde(default)]
    pub include_statements: bool,
    /// Entity detection: none (normal), detectEntities (entities and keywords), extractEntitiesOnly (only entities).
    #[serde(default)]
    pub modify_analyzed_text: ModifyAnalyzedText,
}

impl Validate for CreateKnowledgeGraphParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("graphName", &self.graph_name)?;
        require_non_empty("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeExistingGraphParams {
    /// Name of the existing InfraNodus graph in your account to retrieve.
    #[schemars(length(min = 1))]
    pub graph_name: String,
    /// Include processed statements in the response.
    #[serde(default = "default_true")]
    pub include_statements: bool,
    /// Include the AI-generated graph summary for RAG prompt augmentation.
    #[serde(default)]
    pub include_graph_summary: bool,
    /// Include the graph structure (attributes only unless addNodesAndEdges is also set).
    #[serde(default)]
    pub include_graph: bool,
    /// Include raw node and edge arrays in the graph structure.
    #[serde(default)]
    pub add_nodes_and_edges: bool,
}

impl Validate for AnalyzeExistingGraphParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("graphName", &self.graph_name)
    }
}

/// Input shared by the text-only analysis tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextParams {
    /// Text that you'd like to analyze.
    #[schemars(length(min = 1))]
    pub text: String,
}

impl Validate for TextParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsParams {
    /// Text that you'd like to analyze.
    #[schemars(length(min = 1))]
    pub text: String,
    /// Sections to produce: all, summary, topics, gaps, or questions.
    #[serde(default)]
    pub insight_type: InsightType,
}

impl Validate for InsightsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchQuestionsParams {
    /// Text to generate research questions from.
    #[schemars(length(min = 1))]
    pub text: String,
    /// Use several content gaps instead of the main one.
    #[serde(default)]
    pub use_several_gaps: bool,
    /// Which gap to use: 0 is the most prominent gap, higher values go deeper.
    #[serde(default)]
    pub gap_depth: u32,
    /// Model used by InfraNodus to phrase the questions.
    #[serde(default = "default_model")]
    pub model_to_use: String,
}

impl Validate for ResearchQuestionsParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("text", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchQuestionsFromGraphParams {
    /// Name of the existing InfraNodus graph in your account.
    #[schemars(length(min = 1))]
    pub graph_name: String,
    /// Use several content gaps instead of the main one.
    #[serde(default)]
    pub use_several_gaps: bool,
    /// Which gap to use: 0 is the most prominent gap, higher values go deeper.
    #[serde(default)]
    pub gap_depth: u32,
    /// Model used by InfraNodus to phrase the questions.
    #[serde(default = "default_model")]
    pub model_to_use: String,
}

impl Validate for ResearchQuestionsFromGraphParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("graphName", &self.graph_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponsesFromGraphParams {
    /// Name of the existing InfraNodus graph in your account.
    #[schemars(length(min = 1))]
    pub graph_name: String,
    /// Prompt to answer using the graph as context.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Model used by InfraNodus to generate the responses.
    #[serde(default = "default_model")]
    pub model_to_use: String,
}

impl Validate for ResponsesFromGraphParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("graphName", &self.graph_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Concepts or terms to find.
    #[schemars(length(min = 1))]
    pub query: String,
    /// Graph names to search in; empty searches all of your graphs.
    #[serde(default)]
    pub context_names: Vec<String>,
}

impl Validate for SearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("query", &self.query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    /// Search result id in the form `user:graph:query`.
    #[schemars(length(min = 1))]
    pub id: String,
}

impl Validate for FetchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        FetchId::parse(&self.id).map(|_| ())
    }
}

/// Decomposed `user:graph[:query]` search result identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchId {
    pub user_name: String,
    pub graph_name: String,
    pub query: String,
}

impl FetchId {
    /// Splits on the first two colons; the query keeps any further colons.
    ///
    /// # Errors
    /// Returns `ValidationError::MalformedId` when the user or graph segment is missing.
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedId {
            field: "id",
            value: id.to_string(),
        };
        let mut segments = id.splitn(3, ':');
        let user_name = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let graph_name = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let query = segments.next().unwrap_or_default();
        Ok(Self {
            user_name: user_name.to_string(),
            graph_name: graph_name.to_string(),
            query: query.to_string(),
        })
    }

    /// Re-encodes the identifier in the form search results hand out.
    #[must_use]
    pub fn format(user_name: &str, graph_name: &str, query: &str) -> String {
        format!("{user_name}:{graph_name}:{query}")
    }
}
