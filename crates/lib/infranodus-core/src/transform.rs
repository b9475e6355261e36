//! Projections from a normalized [`GraphResponse`] into tool outputs.
//!
//! Every function here is pure. Fields missing from the source are omitted from
//! the output rather than replaced with empty values.

use serde::Serialize;
use serde_json::Value;

use crate::model::{ClusterNode, GraphAttributes, GraphResponse, GraphologyGraph, TopCluster};
use crate::tools::params::{FetchId, InsightType};

const INSIGHT_TOPICS: usize = 7;
const INSIGHT_TOPIC_CONCEPTS: usize = 10;
const INSIGHT_GAPS: usize = 7;
const GAP_QUESTIONS: usize = 5;
const TOP_NODE_QUESTIONS: usize = 3;
const MANY_GAPS: usize = 5;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub modularity: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub cluster_count: usize,
}

/// Which parts of the graph object a knowledge-graph projection carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphProjection {
    pub include_graph: bool,
    pub include_nodes_and_edges: bool,
}

impl GraphProjection {
    #[must_use]
    pub const fn new(include_graph: bool, include_nodes_and_edges: bool) -> Self {
        Self {
            include_graph,
            include_nodes_and_edges,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraphOutput {
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_topical_clusters: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_concepts: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conceptual_gateways: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_relations: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_bigrams: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<GraphologyGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_graph_by_cluster: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_clusters: Option<Vec<TopCluster>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Full knowledge-graph projection.
///
/// `dotGraphByCluster` and `top_clusters` are moved to the top level and never
/// appear inside `knowledgeGraph`. Node and edge arrays are dropped unless
/// `projection.include_nodes_and_edges` is set.
#[must_use]
pub fn knowledge_graph(response: GraphResponse, projection: GraphProjection) -> KnowledgeGraphOutput {
    let mut output = KnowledgeGraphOutput {
        graph_summary: non_empty(response.graph_summary),
        statements: response.statements,
        user_name: non_empty(response.user_name),
        graph_name: non_empty(response.graph_name),
        graph_url: non_empty(response.graph_url),
        is_public: response.is_public,
        ..KnowledgeGraphOutput::default()
    };

    if let Some(summary) = response.extended_graph_summary {
        output.content_gaps = summary.content_gaps;
        output.main_topical_clusters = summary.main_topics;
        output.main_concepts = summary.main_concepts;
        output.conceptual_gateways = summary.conceptual_gateways;
        output.top_relations = summary.top_relations;
        output.top_bigrams = summary.top_bigrams;
    }

    let Some(mut graph) = response.graph.and_then(|graph| graph.graphology_graph) else {
        return output;
    };

    output.statistics = Statistics {
        modularity: graph
            .attributes
            .as_ref()
            .and_then(|attributes| attributes.modularity)
            .filter(|modularity| modularity.is_finite())
            .unwrap_or_default(),
        node_count: graph.nodes.as_ref().map_or(0, Vec::len),
        edge_count: graph.edges.as_ref().map_or(0, Vec::len),
        cluster_count: graph
            .attributes
            .as_ref()
            .and_then(|attributes| attributes.top_clusters.as_ref())
            .map_or(0, Vec::len),
    };

    if let Some(attributes) = graph.attributes.as_mut() {
        output.knowledge_graph_by_cluster = attributes.dot_graph_by_cluster.take();
        output.top_clusters = attributes.top_clusters.take();
    }

    if projection.include_graph {
        if !projection.include_nodes_and_edges {
            graph.nodes = None;
            graph.edges = None;
        }
        output.knowledge_graph = Some(graph);
    }

    output
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_gaps: Option<Vec<Value>>,
}

#[must_use]
pub fn content_gaps(response: GraphResponse) -> GapsOutput {
    GapsOutput {
        content_gaps: response
            .extended_graph_summary
            .and_then(|summary| summary.content_gaps),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topical_clusters: Option<Vec<Value>>,
}

#[must_use]
pub fn topical_clusters(response: GraphResponse) -> TopicsOutput {
    TopicsOutput {
        topical_clusters: response
            .extended_graph_summary
            .and_then(|summary| summary.main_topics),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverviewOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_overview: Option<String>,
}

#[must_use]
pub fn text_overview(response: GraphResponse) -> TextOverviewOutput {
    TextOverviewOutput {
        text_overview: non_empty(response.graph_summary),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResearchQuestionsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Value>>,
}

#[must_use]
pub fn research_questions(response: GraphResponse) -> ResearchQuestionsOutput {
    ResearchQuestionsOutput {
        questions: response.ai_advice,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponsesOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<Value>>,
}

#[must_use]
pub fn responses(response: GraphResponse) -> ResponsesOutput {
    ResponsesOutput {
        responses: response.ai_advice,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightTopic {
    pub name: String,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightGap {
    pub description: String,
    pub concepts: [String; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridges: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<InsightTopic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<InsightGap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_insights: Option<Vec<String>>,
}

/// Derives a compact, human-readable digest of a text graph.
#[must_use]
pub fn insights(response: &GraphResponse, insight_type: InsightType) -> InsightsOutput {
    let attributes = response.attributes();
    let mut output = InsightsOutput::default();

    if insight_type.includes(InsightType::Summary) {
        output.summary = response
            .graph_summary
            .clone()
            .filter(|summary| !summary.is_empty());
    }

    if insight_type.includes(InsightType::Topics) {
        output.topics = attributes
            .and_then(|attributes| attributes.top_clusters.as_ref())
            .map(|clusters| {
                clusters
                    .iter()
                    .take(INSIGHT_TOPICS)
                    .map(|cluster| InsightTopic {
                        name: cluster.label(),
                        concepts: cluster
                            .nodes
                            .iter()
                            .flatten()
                            .take(INSIGHT_TOPIC_CONCEPTS)
                            .map(ClusterNode::name)
                            .collect(),
                    })
                    .collect()
            });
    }

    if insight_type.includes(InsightType::Gaps) {
        output.gaps = attributes
            .and_then(|attributes| attributes.gaps.as_ref())
            .map(|gaps| {
                gaps.iter()
                    .take(INSIGHT_GAPS)
                    .map(|gap| InsightGap {
                        description: format!(
                            "Potential connection between \"{}\" and \"{}\"",
                            gap.source_name(),
                            gap.target_name()
                        ),
                        concepts: [gap.source_name(), gap.target_name()],
                        bridges: gap.concepts.clone(),
                    })
                    .collect()
            });
    }

    if insight_type.includes(InsightType::Questions) {
        output.questions = Some(attributes.map_or_else(Vec::new, insight_questions));
    }

    if insight_type == InsightType::All {
        output.key_insights = Some(
            attributes
                .map(|attributes| key_insights(attributes, response.statements.as_deref()))
                .unwrap_or_default(),
        );
    }

    output
}

fn insight_questions(attributes: &GraphAttributes) -> Vec<String> {
    let gap_questions = attributes.gaps.iter().flatten().take(GAP_QUESTIONS).map(|gap| {
        format!(
            "How might \"{}\" relate to or influence \"{}\"?",
            gap.source_name(),
            gap.target_name()
        )
    });
    let node_questions = attributes
        .top_nodes
        .iter()
        .flatten()
        .take(TOP_NODE_QUESTIONS)
        .map(|node| {
            format!("What role does \"{node}\" play in connecting different aspects of this topic?")
        });
    gap_questions.chain(node_questions).collect()
}

fn key_insights(attributes: &GraphAttributes, statements: Option<&[Value]>) -> Vec<String> {
    let mut insights = Vec::new();

    match attributes.modularity {
        Some(modularity) if modularity > 0.4 => {
            insights.push("The text has well-defined, distinct topic clusters".to_string());
        }
        Some(modularity) if modularity < 0.2 => {
            insights.push("The text is highly interconnected with overlapping themes".to_string());
        }
        _ => {}
    }

    if let Some(gaps) = attributes.gaps.as_ref().filter(|gaps| gaps.len() > MANY_GAPS) {
        insights.push(format!(
            "Found {} potential connections between disparate topics",
            gaps.len()
        ));
    }

    if let Some(dominant) = attributes.top_clusters.as_ref().and_then(|clusters| clusters.first()) {
        let total = statements.map_or(0, <[Value]>::len).max(1);
        // More than half of all statements belong to the first cluster.
        if dominant.statement_count() * 2 > total {
            let name = dominant
                .ai_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or("one main topic");
            insights.push(format!("The text is strongly focused on \"{name}\""));
        }
    }

    insights
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
}

/// One result per matching graph; ids are the `user:graph:query` form `fetch` accepts.
#[must_use]
pub fn search(response: &GraphResponse, query: &str) -> SearchOutput {
    let user_name = response.user_name.as_deref().unwrap_or_default();
    let urls = response.graph_urls.as_deref().unwrap_or_default();
    SearchOutput {
        results: response.graph_names.as_ref().map(|names| {
            names
                .iter()
                .enumerate()
                .map(|(index, graph_name)| SearchResult {
                    id: FetchId::format(user_name, graph_name, query),
                    title: graph_name.clone(),
                    url: urls.get(index).cloned().unwrap_or_default(),
                })
                .collect()
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutput {
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Expands a single search result into its matching text.
#[must_use]
pub fn fetch(response: &GraphResponse, id: &str, fetch_id: &FetchId) -> FetchOutput {
    let texts = response
        .entries_added
        .as_ref()
        .map(|entries| entries.texts.as_slice())
        .filter(|texts| !texts.is_empty());
    let text = match texts {
        Some(texts) => texts.join("\n\n"),
        None => response
            .statements
            .iter()
            .flatten()
            .filter_map(|statement| statement.get("content").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n\n"),
    };
    FetchOutput {
        id: id.to_string(),
        title: format!("{}: {}", fetch_id.graph_name, fetch_id.query),
        text,
        url: response
            .graph_urls
            .as_ref()
            .and_then(|urls| urls.first())
            .cloned()
            .unwrap_or_default(),
    }
}
