//! Response model for the InfraNodus graph endpoints.
//!
//! Fields the transformers compute on are typed; everything that is only passed
//! through to clients stays as raw JSON so upstream additions survive untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodusError;

/// Envelope key used by older API revisions.
pub const ENVELOPE_FIELD: &str = "entriesAndGraphOfContext";

/// A decoded API payload in one of the two shapes the API has shipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    /// `{"entriesAndGraphOfContext": {...}}`
    Enveloped(GraphResponse),
    Inline(GraphResponse),
}

impl ApiPayload {
    /// Decodes a parsed response body, unwrapping the envelope when present.
    ///
    /// # Errors
    /// Returns `NodusError::Decode` when the body does not match the response model.
    pub fn from_value(mut value: Value) -> Result<Self, NodusError> {
        let enveloped = value
            .as_object_mut()
            .and_then(|object| object.remove(ENVELOPE_FIELD))
            .filter(|inner| !inner.is_null());

        match enveloped {
            Some(inner) => Ok(Self::Enveloped(decode(inner)?)),
            None => Ok(Self::Inline(decode(value)?)),
        }
    }

    #[must_use]
    pub const fn is_enveloped(&self) -> bool {
        matches!(self, Self::Enveloped(_))
    }

    #[must_use]
    pub fn into_response(self) -> GraphResponse {
        match self {
            Self::Enveloped(response) | Self::Inline(response) => response,
        }
    }
}

fn decode(value: Value) -> Result<GraphResponse, NodusError> {
    serde_json::from_value(value).map_err(|err| NodusError::Decode(err.to_string()))
}

/// Canonical graph/statement response after envelope normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_graph_summary: Option<ExtendedGraphSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    // Search endpoint fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_added: Option<EntriesAdded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_names: Option<Vec<String>>,
}

impl GraphResponse {
    /// Upstream error message as sent. An empty string is not an error.
    #[must_use]
    pub fn upstream_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }

    #[must_use]
    pub fn graphology(&self) -> Option<&GraphologyGraph> {
        self.graph.as_ref()?.graphology_graph.as_ref()
    }

    #[must_use]
    pub fn attributes(&self) -> Option<&GraphAttributes> {
        self.graphology()?.attributes.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphology_graph: Option<GraphologyGraph>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphologyGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<GraphAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Graph-level attributes. Key names follow the API, which mixes snake and camel case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_nodes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_clusters: Option<Vec<TopCluster>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<GraphGap>>,
    #[serde(
        rename = "dotGraphByCluster",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dot_graph_by_cluster: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCluster {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub community: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<ClusterNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TopCluster {
    /// Display label: the AI-generated name, or `Topic <community>`.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(name) = self.ai_name.as_deref().filter(|name| !name.is_empty()) {
            return name.to_string();
        }
        match &self.community {
            Value::Null => "Topic".to_string(),
            community => format!("Topic {}", text_of(community)),
        }
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.statement_ids
            .as_ref()
            .filter(|ids| !ids.is_empty())
            .or(self.statements.as_ref())
            .map_or(0, Vec::len)
    }
}

/// Renders a loosely typed label: strings verbatim, null as empty, anything else as JSON.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub node_name: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterNode {
    #[must_use]
    pub fn name(&self) -> String {
        text_of(&self.node_name)
    }
}

/// A structural gap between two loosely connected clusters.
///
/// Endpoints are kept as raw JSON; older graphs store numeric cluster ids here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphGap {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub source: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub target: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphGap {
    #[must_use]
    pub fn source_name(&self) -> String {
        text_of(&self.source)
    }

    #[must_use]
    pub fn target_name(&self) -> String {
        text_of(&self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedGraphSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_topics: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_concepts: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptual_gateways: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_relations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_bigrams: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntriesAdded {
    #[serde(default)]
    pub ids: Vec<Value>,
    #[serde(default)]
    pub texts: Vec<String>,
}
