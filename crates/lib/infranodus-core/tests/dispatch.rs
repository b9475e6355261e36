use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use infranodus_core::model::{ApiPayload, ENVELOPE_FIELD};
use infranodus_core::request::{Endpoint, GraphQueryRequest};
use infranodus_core::{
    GraphGateway,
    GraphResponse,
    NodusError,
    NodusResult,
    ToolCall,
    ValidationError,
    execute,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let raw = std::fs::read_to_string(&path).unwrap_or_else(|err| {
        let path_display = path.display();
        panic!("failed to read fixture at {path_display}: {err}")
    });
    serde_json::from_str(&raw).unwrap_or_else(|err| panic!("invalid fixture {name}: {err}"))
}

/// Answers every request with the same canned body and records what it was sent.
struct MockGateway {
    body: Value,
    calls: AtomicUsize,
    requests: Mutex<Vec<GraphQueryRequest>>,
}

impl MockGateway {
    fn new(body: Value) -> Self {
        Self {
            body,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn from_fixture(name: &str) -> Self {
        Self::new(fixture(name))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> GraphQueryRequest {
        self.requests
            .lock()
            .expect("request log poisoned")
            .last()
            .cloned()
            .expect("a request was sent")
    }
}

#[async_trait]
impl GraphGateway for MockGateway {
    async fn send(&self, request: &GraphQueryRequest) -> NodusResult<GraphResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        Ok(ApiPayload::from_value(self.body.clone())?.into_response())
    }
}

async fn run(gateway: &MockGateway, tool: &str, arguments: Value) -> NodusResult<Value> {
    let call = ToolCall::from_arguments(tool, arguments)?;
    let output = execute(gateway, &call).await?;
    Ok(serde_json::to_value(&output).expect("output serializes"))
}

#[tokio::test]
async fn knowledge_graph_matches_golden_output() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let output = run(&gateway, "generateKnowledgeGraph", json!({ "text": "quantum" }))
        .await
        .expect("tool succeeds");
    assert_eq!(output, fixture("expected_knowledge_graph.json"));
}

#[tokio::test]
async fn knowledge_graph_default_request() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    run(&gateway, "generateKnowledgeGraph", json!({ "text": "quantum" }))
        .await
        .expect("tool succeeds");

    let request = gateway.last_request();
    let url = request
        .url("https://infranodus.com/api/v1")
        .expect("valid url");
    assert_eq!(
        url.as_str(),
        "https://infranodus.com/api/v1/graphAndStatements?doNotSave=true&addStats=true\
         &includeStatements=false&includeGraphSummary=false&extendedGraphSummary=true\
         &includeGraph=false&aiTopics=true&optimize=develop"
    );
    assert_eq!(
        Value::Object(request.body),
        json!({ "text": "quantum", "aiTopics": "true" })
    );
}

#[tokio::test]
async fn envelope_and_inline_shapes_agree() {
    let inline = MockGateway::from_fixture("graph_and_statements.json");
    let enveloped =
        MockGateway::new(json!({ ENVELOPE_FIELD: fixture("graph_and_statements.json") }));
    let arguments = json!({ "text": "quantum", "includeGraph": true, "addNodesAndEdges": true });

    let from_inline = run(&inline, "generateKnowledgeGraph", arguments.clone())
        .await
        .expect("inline succeeds");
    let from_envelope = run(&enveloped, "generateKnowledgeGraph", arguments)
        .await
        .expect("envelope succeeds");
    assert_eq!(from_inline, from_envelope);
}

#[tokio::test]
async fn requested_graph_loses_lifted_fields() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let output = run(
        &gateway,
        "analyzeExistingGraphByName",
        json!({ "graphName": "physics", "includeGraph": true }),
    )
    .await
    .expect("tool succeeds");

    assert_eq!(output["topClusters"][0]["aiName"], json!("Quantum Mechanics"));
    let graph = &output["knowledgeGraph"];
    assert!(graph["attributes"].get("top_clusters").is_none());
    assert!(graph["attributes"].get("dotGraphByCluster").is_none());
    assert_eq!(graph["attributes"]["top_nodes"][0], json!("qubit"));
    assert!(graph.get("nodes").is_none());
    assert!(graph.get("edges").is_none());
    assert_eq!(output["statistics"]["nodeCount"], json!(4));

    let request = gateway.last_request();
    assert_eq!(request.query_value("includeStatements"), Some("true"));
    assert_eq!(request.body_value("name"), Some(&json!("physics")));
    assert!(request.body_value("text").is_none());
}

#[tokio::test]
async fn created_graph_strips_nodes_and_edges() {
    let mut body = fixture("graph_and_statements.json");
    body["userName"] = json!("alice");
    body["graphName"] = json!("physics");
    body["graphUrl"] = json!("https://infranodus.com/alice/physics");
    body["isPublic"] = json!(false);
    let gateway = MockGateway::new(body);

    let output = run(
        &gateway,
        "createKnowledgeGraph",
        json!({ "graphName": "physics", "text": "quantum" }),
    )
    .await
    .expect("tool succeeds");

    assert_eq!(output["graphUrl"], json!("https://infranodus.com/alice/physics"));
    assert_eq!(output["isPublic"], json!(false));
    assert!(output["knowledgeGraph"].get("nodes").is_none());
    assert_eq!(gateway.last_request().query_value("doNotSave"), Some("false"));
}

#[tokio::test]
async fn summary_projections_match_golden_output() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let text = json!({ "text": "quantum" });

    assert_eq!(
        run(&gateway, "generateContentGaps", text.clone()).await.unwrap(),
        json!({ "contentGaps": ["Quantum Mechanics <-> Classical Storage"] })
    );
    assert_eq!(
        run(&gateway, "generateTopicalClusters", text.clone()).await.unwrap(),
        json!({
            "topicalClusters": [
                "1. Quantum Mechanics: qubit entanglement",
                "2. Classical Storage: bit"
            ]
        })
    );
    assert_eq!(
        run(&gateway, "generateTextOverview", text).await.unwrap(),
        json!({
            "textOverview": "The text contrasts quantum computing with classical information storage."
        })
    );
    assert_eq!(gateway.calls(), 3);
}

#[tokio::test]
async fn insights_match_golden_output() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let output = run(&gateway, "generateInsights", json!({ "text": "quantum" }))
        .await
        .expect("tool succeeds");

    assert_eq!(
        output,
        json!({
            "summary": "The text contrasts quantum computing with classical information storage.",
            "topics": [
                { "name": "Quantum Mechanics", "concepts": ["qubit", "entanglement"] },
                { "name": "Topic 1", "concepts": ["bit"] }
            ],
            "gaps": [
                {
                    "description": "Potential connection between \"0\" and \"1\"",
                    "concepts": ["0", "1"],
                    "bridges": ["information"]
                }
            ],
            "questions": [
                "How might \"0\" relate to or influence \"1\"?",
                "What role does \"qubit\" play in connecting different aspects of this topic?",
                "What role does \"information\" play in connecting different aspects of this topic?",
                "What role does \"computer\" play in connecting different aspects of this topic?"
            ],
            "keyInsights": ["The text is strongly focused on \"Quantum Mechanics\""]
        })
    );
}

#[tokio::test]
async fn advice_projections_match_golden_output() {
    let gateway = MockGateway::from_fixture("graph_and_advice.json");
    let advice = fixture("graph_and_advice.json")["aiAdvice"].clone();

    let questions = run(
        &gateway,
        "generateResearchQuestions",
        json!({ "text": "quantum", "useSeveralGaps": true, "gapDepth": 1 }),
    )
    .await
    .unwrap();
    assert_eq!(questions, json!({ "questions": advice }));
    let request = gateway.last_request();
    assert_eq!(request.endpoint, Endpoint::GraphAndAdvice);
    assert_eq!(request.query_value("gapDepth"), Some("1"));

    let responses = run(
        &gateway,
        "generateResponsesFromGraph",
        json!({ "graphName": "physics", "prompt": "What is missing?" }),
    )
    .await
    .unwrap();
    assert_eq!(responses, json!({ "responses": advice }));
    assert_eq!(
        gateway.last_request().body_value("prompt"),
        Some(&json!("What is missing?"))
    );
}

#[tokio::test]
async fn empty_text_is_rejected_without_a_call() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let calls = [
        ("generateKnowledgeGraph", json!({ "text": "" })),
        ("createKnowledgeGraph", json!({ "graphName": "g", "text": "" })),
        ("generateContentGaps", json!({ "text": "" })),
        ("generateTopicalClusters", json!({ "text": "" })),
        ("generateTextOverview", json!({ "text": "" })),
        ("generateInsights", json!({ "text": "" })),
        ("generateResearchQuestions", json!({ "text": "" })),
        ("generateResearchQuestionsStreaming", json!({ "text": "  " })),
    ];

    for (tool, arguments) in calls {
        let err = run(&gateway, tool, arguments).await.unwrap_err();
        match err {
            NodusError::Validation(ValidationError::EmptyField { field }) => {
                assert_eq!(field, "text", "{tool}");
            }
            other => panic!("{tool}: expected validation error, got {other:?}"),
        }
    }
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn fetch_decomposes_id() {
    let gateway = MockGateway::from_fixture("search.json");
    let output = run(
        &gateway,
        "fetch",
        json!({ "id": "alice:mygraph:quantum computing" }),
    )
    .await
    .expect("tool succeeds");

    let request = gateway.last_request();
    assert_eq!(request.endpoint, Endpoint::Search);
    assert_eq!(
        Value::Object(request.body),
        json!({
            "query": "quantum computing",
            "contextNames": "mygraph",
            "userName": "alice"
        })
    );
    assert_eq!(
        output,
        json!({
            "id": "alice:mygraph:quantum computing",
            "title": "mygraph: quantum computing",
            "text": "Entanglement links the state of two qubits.\n\nQuantum computing relies on entanglement.",
            "url": "https://infranodus.com/alice/physics"
        })
    );
}

#[tokio::test]
async fn fetch_rejects_id_without_separator() {
    let gateway = MockGateway::from_fixture("search.json");
    let err = run(&gateway, "fetch", json!({ "id": "alice" })).await.unwrap_err();
    assert!(matches!(
        err,
        NodusError::Validation(ValidationError::MalformedId { field: "id", .. })
    ));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn search_results_round_trip_into_fetch() {
    let gateway = MockGateway::from_fixture("search.json");
    let output = run(
        &gateway,
        "search",
        json!({ "query": "entanglement", "contextNames": ["physics", "reading-notes"] }),
    )
    .await
    .expect("tool succeeds");

    assert_eq!(
        output,
        json!({
            "results": [
                {
                    "id": "alice:physics:entanglement",
                    "title": "physics",
                    "url": "https://infranodus.com/alice/physics"
                },
                {
                    "id": "alice:reading-notes:entanglement",
                    "title": "reading-notes",
                    "url": "https://infranodus.com/alice/reading-notes"
                }
            ]
        })
    );
    assert_eq!(
        gateway.last_request().body_value("contextNames"),
        Some(&json!("physics,reading-notes"))
    );

    let id = output["results"][1]["id"].as_str().expect("id is a string");
    run(&gateway, "fetch", json!({ "id": id }))
        .await
        .expect("search ids are fetchable");
    assert_eq!(
        gateway.last_request().body_value("contextNames"),
        Some(&json!("reading-notes"))
    );
}

#[tokio::test]
async fn content_gaps_are_idempotent() {
    let gateway = MockGateway::from_fixture("graph_and_statements.json");
    let call = ToolCall::from_arguments("generateContentGaps", json!({ "text": "quantum" }))
        .expect("valid call");

    let first = execute(&gateway, &call).await.unwrap().to_pretty_json().unwrap();
    let second = execute(&gateway, &call).await.unwrap().to_pretty_json().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn upstream_error_is_reported_verbatim() {
    let gateway = MockGateway::new(json!({ "error": "Graph physics not found" }));
    let err = run(&gateway, "analyzeExistingGraphByName", json!({ "graphName": "physics" }))
        .await
        .unwrap_err();
    assert!(matches!(err, NodusError::UpstreamDomain(_)));
    assert_eq!(err.to_string(), "Graph physics not found");
}

#[tokio::test]
async fn absent_sections_stay_absent() {
    let gateway = MockGateway::new(json!({}));
    let output = run(&gateway, "generateKnowledgeGraph", json!({ "text": "quantum" }))
        .await
        .unwrap();
    assert_eq!(
        output,
        json!({
            "statistics": { "modularity": 0.0, "nodeCount": 0, "edgeCount": 0, "clusterCount": 0 }
        })
    );
    assert_eq!(
        run(&gateway, "generateResearchQuestions", json!({ "text": "quantum" }))
            .await
            .unwrap(),
        json!({})
    );
}
