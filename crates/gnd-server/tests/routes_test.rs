//! Router tests over an in-memory index.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use gnd_core::{
    BulkItemResult, Engine, GndConfig, GndResult, IndexDocument, SearchHit, SearchHits,
    SearchIndex, SearchRequest,
};
use gnd_server::{create_server, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct MemoryIndex {
    documents: BTreeMap<String, Value>,
    requests: Mutex<Vec<SearchRequest>>,
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn create_index(&self) -> GndResult<()> {
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> GndResult<SearchHits> {
        self.requests.lock().unwrap().push(request);
        let hits: Vec<SearchHit> = self
            .documents
            .iter()
            .map(|(id, source)| SearchHit {
                id: id.clone(),
                score: 75.0,
                source: source.clone(),
            })
            .collect();
        Ok(SearchHits {
            total: hits.len() as u64,
            hits,
        })
    }

    async fn get(&self, id: &str) -> GndResult<Option<Value>> {
        Ok(self.documents.get(id).cloned())
    }

    async fn bulk_index(&self, documents: Vec<IndexDocument>) -> GndResult<Vec<BulkItemResult>> {
        Ok(documents.into_iter().map(|d| BulkItemResult::ok(d.id)).collect())
    }

    fn index_name(&self) -> &str {
        "gnd-memory"
    }
}

fn app() -> Router {
    let mut index = MemoryIndex::default();
    index.documents.insert(
        "118540238".to_string(),
        json!({
            "id": "https://d-nb.info/gnd/118540238",
            "type": ["AuthorityResource", "DifferentiatedPerson"],
            "preferredName": "Goethe, Johann Wolfgang von",
            "dateOfBirth": ["1749-08-28"],
            "placeOfBirth": [{"id": "https://d-nb.info/gnd/4018118-2", "label": "Frankfurt am Main"}]
        }),
    );
    let engine = Engine::new(GndConfig::default(), Arc::new(index)).unwrap();
    create_server(AppState::new(engine))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(
        app(),
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

/// Percent-encode a parameter value.
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["index"], "gnd-memory");
}

#[tokio::test]
async fn test_manifest_without_parameters() {
    let (status, body) = get("/reconcile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifierSpace"], "https://d-nb.info/gnd/");
    assert_eq!(body["versions"], json!(["0.1", "0.2"]));
}

#[tokio::test]
async fn test_reconcile_queries_get() {
    let queries = json!({ "q0": { "query": "Goethe", "type": "Person", "limit": "3" } });
    let uri = format!("/reconcile?queries={}", encode(&queries.to_string()));

    let (status, body) = get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    let result = &body["q0"]["result"];
    assert_eq!(result[0]["id"], "118540238");
    assert_eq!(result[0]["name"], "Goethe, Johann Wolfgang von");
    assert_eq!(result[0]["match"], true);
    assert_eq!(result[0]["type"][0]["id"], "Person");
}

#[tokio::test]
async fn test_reconcile_queries_post_form() {
    let queries = json!({ "q0": { "query": "Goethe" }, "q1": { "query": "" } });
    let request = Request::builder()
        .method("POST")
        .uri("/reconcile")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("queries={}", encode(&queries.to_string()))))
        .unwrap();

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["q0"]["result"][0]["id"], "118540238");
    assert_eq!(body["q1"]["result"], json!([]));
}

#[tokio::test]
async fn test_single_plain_query() {
    let (status, body) = get("/reconcile?query=Goethe").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["id"], "118540238");
}

#[tokio::test]
async fn test_invalid_queries_json() {
    let (status, body) = get("/reconcile?queries=%7Bnot-json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_extend() {
    let extend = json!({
        "ids": ["118540238", "000"],
        "properties": [{ "id": "placeOfBirth" }, { "id": "dateOfBirth", "settings": { "limit": "1" } }]
    });
    let uri = format!("/reconcile?extend={}", encode(&extend.to_string()));

    let (status, body) = get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"][0]["name"], "Geburtsort");
    assert_eq!(
        body["rows"]["118540238"]["placeOfBirth"],
        json!([{ "id": "4018118-2", "name": "Frankfurt am Main" }])
    );
    assert_eq!(
        body["rows"]["118540238"]["dateOfBirth"],
        json!([{ "str": "1749-08-28" }])
    );
    assert_eq!(body["rows"]["000"]["placeOfBirth"], json!([{}]));
}

#[tokio::test]
async fn test_suggest_endpoints() {
    let (status, body) = get("/reconcile/suggest/entity?prefix=Goe").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["id"], "118540238");

    let (_, body) = get("/reconcile/suggest/type?prefix=pers&limit=1").await;
    assert_eq!(body["result"], json!([{ "id": "Person", "name": "Person" }]));

    let (_, body) = get("/reconcile/suggest/property?prefix=geburtsort&type=Person").await;
    assert_eq!(body["result"][0]["id"], "placeOfBirth");
}

#[tokio::test]
async fn test_flyout() {
    let (status, body) = get("/reconcile/flyout/entity?id=118540238").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["html"]
        .as_str()
        .unwrap()
        .contains("Goethe, Johann Wolfgang von"));

    let (status, body) = get("/reconcile/flyout/entity?id=000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_propose_properties() {
    let (status, body) = get("/reconcile/properties?type=Person&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "Person");
    assert_eq!(body["properties"].as_array().unwrap().len(), 3);
    assert_eq!(body["limit"], 3);

    let (status, _) = get("/reconcile/properties").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
