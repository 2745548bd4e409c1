//! Integration test: serve a stub `generateContent` endpoint on a local port and drive
//! `GeminiClient` + `CivicGateway` through real HTTP.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use civic::gateway::{AnalysisError, CivicGateway, SearchError};
use civic::llm::{GeminiClient, GenerationError};
use civic::model::{BillStatus, MediaKind};

const KEY: &str = "test-key";

#[derive(Clone, Default)]
struct Stub {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

fn reply(text: &str) -> Json<Value> {
    Json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

fn search_reply() -> String {
    let bills = json!([
        {
            "id": "dpdp-2023",
            "title": "Digital Personal Data Protection Act",
            "summary": "Rules for processing personal data.",
            "category": "Technology",
            "status": "Passed",
            "date": "Passed on Aug 9, 2023",
            "voteCount": { "for": 300, "against": "n/a" }
        },
        {
            "id": "dpdp-2023",
            "title": "Telecommunications Bill",
            "summary": "Replaces colonial-era telegraph law.",
            "category": "Technology",
            "status": "In Process",
            "date": "Introduced on Dec 18, 2023",
            "voteCount": { "for": "120", "against": 45 }
        }
    ]);
    format!("Here you go:\n```json\n{}\n```", bills)
}

fn analysis_reply() -> String {
    json!({
        "simplifiedExplanation": "It sets rules for how companies use your data.",
        "viewpoints": { "pro": "Privacy.", "con": "Compliance cost.", "neutral": "Depends on rules." },
        "impactData": [{ "name": "Startups", "ifPassed": 140, "ifNotPassed": -20 }],
        "parliamentaryDebate": [{ "speaker": "A. Member", "party": "Independent", "statement": "Needed." }],
        "media": [
            { "type": "News", "title": "Explainer", "description": "Read more", "uri": "https://example.org/dpdp" },
            { "type": "Audio", "title": "Podcast", "description": "Listen in", "uri": "https://example.org/a" }
        ],
        "flashcards": [{ "question": "Who is a data fiduciary?", "answer": "Whoever decides the purpose." }],
        "mindMap": { "centralTopic": "DPDP", "branches": [{ "title": "Rights", "children": ["Access"] }] }
    })
    .to_string()
}

async fn generate(
    State(stub): State<Stub>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(KEY) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    stub.calls.lock().unwrap().push((call, body.clone()));
    if body.get("tools").is_some() {
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
        if prompt.contains("with sources") {
            let text = format!("{}\nSources: see ```grounding notes``` above.", search_reply());
            return Ok(reply(&text));
        }
        Ok(reply(&search_reply()))
    } else {
        Ok(reply(&analysis_reply()))
    }
}

async fn start_stub() -> (SocketAddr, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, stub)
}

fn client(addr: SocketAddr, key: &str) -> GeminiClient {
    GeminiClient::new(format!("http://{}/v1beta/", addr), "gemini-test", key)
}

#[tokio::test]
async fn search_goes_through_grounded_generate_content() {
    let (addr, stub) = start_stub().await;
    let gateway = CivicGateway::new(client(addr, KEY));

    let bills = gateway.search_bills("data protection").await.expect("search");
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0].vote_count.for_votes, 300);
    assert_eq!(bills[0].vote_count.against, 0);
    assert_eq!(bills[1].status, BillStatus::InProcess);
    assert_eq!(bills[1].vote_count.for_votes, 120);
    assert_ne!(bills[0].id, bills[1].id);

    let calls = stub.calls.lock().unwrap();
    let (call, body) = &calls[0];
    assert_eq!(call, "gemini-test:generateContent");
    assert_eq!(body["tools"][0]["google_search"], json!({}));
    assert!(body.get("generationConfig").is_none());
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("\"data protection\""));
}

#[tokio::test]
async fn search_ignores_prose_after_the_fenced_block() {
    let (addr, _stub) = start_stub().await;
    let gateway = CivicGateway::new(client(addr, KEY));

    let bills = gateway.search_bills("telecom with sources").await.expect("search");
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[1].title, "Telecommunications Bill");
}

#[tokio::test]
async fn analysis_sends_schema_and_normalizes_reply() {
    let (addr, stub) = start_stub().await;
    let gateway = CivicGateway::new(client(addr, KEY));

    let analysis = gateway
        .analyze_bill("Digital Personal Data Protection Act", "English")
        .await
        .expect("analysis");
    assert_eq!(analysis.impact[0].if_passed, 100.0);
    assert_eq!(analysis.media[0].kind, MediaKind::News);
    assert_eq!(analysis.media[0].uri.as_deref(), Some("https://example.org/dpdp"));
    assert_eq!(analysis.media[1].uri, None);
    assert_eq!(analysis.mind_map.branches[0].children, vec!["Access".to_string()]);

    let calls = stub.calls.lock().unwrap();
    let body = &calls[0].1;
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn rejected_key_surfaces_as_api_error() {
    let (addr, stub) = start_stub().await;
    let gateway = CivicGateway::new(client(addr, "wrong-key"));

    match gateway.analyze_bill("Any Bill", "English").await {
        Err(AnalysisError::Generation(GenerationError::Api(msg))) => assert!(msg.starts_with("401")),
        other => panic!("expected api error, got {:?}", other),
    }
    assert!(matches!(
        gateway.search_bills("anything").await,
        Err(SearchError::Generation(GenerationError::Api(_)))
    ));
    assert!(stub.calls.lock().unwrap().is_empty());
}
