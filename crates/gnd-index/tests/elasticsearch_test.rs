//! Elasticsearch client against an in-process fake cluster.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use gnd_core::config::IndexConfig;
use gnd_core::error::ErrorCode;
use gnd_core::traits::{AuxQuery, BoostedField, IndexDocument, SearchIndex, SearchRequest};
use gnd_index::ElasticsearchIndex;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Cluster {
    searches: Arc<Mutex<Vec<Value>>>,
    bulk_bodies: Arc<Mutex<Vec<String>>>,
    created: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn create(
    State(cluster): State<Cluster>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut created = cluster.created.lock().unwrap();
    if index == "locked" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "type": "security_exception" } })),
        );
    }
    if created.iter().any(|(name, _)| *name == index) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "type": "resource_already_exists_exception" } })),
        );
    }
    created.push((index.clone(), body));
    (StatusCode::OK, Json(json!({ "acknowledged": true, "index": index })))
}

async fn search(
    State(cluster): State<Cluster>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    cluster.searches.lock().unwrap().push(body);
    if index == "broken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "type": "query_shard_exception" } })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [{
                    "_id": "118540238",
                    "_score": 81.2,
                    "_source": {
                        "id": "https://d-nb.info/gnd/118540238",
                        "preferredName": "Goethe, Johann Wolfgang von"
                    }
                }]
            }
        })),
    )
}

async fn get_doc(Path((_index, id)): Path<(String, String)>) -> (StatusCode, Json<Value>) {
    if id == "118540238" {
        (
            StatusCode::OK,
            Json(json!({
                "_id": id,
                "found": true,
                "_source": { "id": "https://d-nb.info/gnd/118540238" }
            })),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "_id": id, "found": false })))
    }
}

async fn bulk(State(cluster): State<Cluster>, body: String) -> Json<Value> {
    let items: Vec<Value> = body
        .lines()
        .step_by(2)
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .map(|action| {
            let id = action["index"]["_id"].as_str().unwrap_or_default().to_string();
            if id == "bad" {
                json!({ "index": { "_id": id, "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse" } } })
            } else {
                json!({ "index": { "_id": id, "status": 201 } })
            }
        })
        .collect();
    cluster.bulk_bodies.lock().unwrap().push(body);
    Json(json!({ "errors": true, "items": items }))
}

async fn start(cluster: Cluster) -> String {
    let app = Router::new()
        .route("/:index", put(create))
        .route("/:index/_search", post(search))
        .route("/:index/_doc/:id", get(get_doc))
        .route("/:index/_bulk", post(bulk))
        .with_state(cluster);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(url: &str, index_name: &str) -> ElasticsearchIndex {
    ElasticsearchIndex::new(&IndexConfig {
        url: url.to_string(),
        index_name: index_name.to_string(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_search() {
    let cluster = Cluster::default();
    let url = start(cluster.clone()).await;
    let index = client(&url, "gnd");

    let hits = index
        .search(SearchRequest {
            query: Some("Goethe".to_string()),
            fields: vec![BoostedField::new("preferredName", 4.0)],
            filter_types: vec!["Person".to_string()],
            aux_query: Some(AuxQuery {
                query: "dateOfBirth:1749".to_string(),
                boost: 5.0,
            }),
            from: 0,
            size: Some(5),
        })
        .await
        .unwrap();

    assert_eq!(hits.total, 1);
    assert_eq!(hits.hits[0].id, "118540238");
    assert_eq!(hits.hits[0].score, 81.2);

    let sent = cluster.searches.lock().unwrap()[0].clone();
    assert_eq!(sent["size"], 5);
    assert_eq!(sent["query"]["bool"]["filter"][0]["terms"]["type"], json!(["Person"]));
    assert_eq!(
        sent["query"]["bool"]["must"][0]["query_string"]["fields"],
        json!(["preferredName^4"])
    );
}

#[tokio::test]
async fn test_create_index() {
    let cluster = Cluster::default();
    let url = start(cluster.clone()).await;
    let index = client(&url, "gnd");

    index.create_index().await.unwrap();
    index.create_index().await.unwrap();

    let created = cluster.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let (name, body) = &created[0];
    assert_eq!(name, "gnd");
    assert_eq!(body["mappings"]["properties"]["type"]["type"], "keyword");
}

#[tokio::test]
async fn test_create_index_refused() {
    let url = start(Cluster::default()).await;
    let index = client(&url, "locked");

    let err = index.create_index().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::IdxOperationFailed);
}

#[tokio::test]
async fn test_search_rejected() {
    let url = start(Cluster::default()).await;
    let index = client(&url, "broken");

    let err = index
        .search(SearchRequest {
            query: Some("Goethe AND".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IdxQueryFailed);
}

#[tokio::test]
async fn test_get() {
    let url = start(Cluster::default()).await;
    let index = client(&url, "gnd");

    let document = index.get("118540238").await.unwrap().unwrap();
    assert_eq!(document["id"], "https://d-nb.info/gnd/118540238");

    assert!(index.get("000").await.unwrap().is_none());
    assert!(index.get("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_bulk_index() {
    let cluster = Cluster::default();
    let url = start(cluster.clone()).await;
    let index = client(&url, "gnd");

    let results = index
        .bulk_index(vec![
            IndexDocument {
                id: "1".to_string(),
                source: json!({ "preferredName": "One" }),
            },
            IndexDocument {
                id: "bad".to_string(),
                source: json!({ "preferredName": 2 }),
            },
        ])
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert_eq!(results[1].id, "bad");
    assert_eq!(
        results[1].error.as_deref(),
        Some("mapper_parsing_exception: failed to parse")
    );

    let bodies = cluster.bulk_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].lines().count(), 4);

    assert!(index.bulk_index(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_cluster() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let index = client(&format!("http://{}", addr), "gnd");
    let err = index.get("118540238").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NetConnectionFailed);
}
