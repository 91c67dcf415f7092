//! Elasticsearch search index.
//!
//! Talks to the REST API directly. OpenSearch accepts the same requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use gnd_core::config::IndexConfig;
use gnd_core::error::{ErrorCode, GndError, GndResult};
use gnd_core::traits::{
    BoostedField, BulkItemResult, IndexDocument, SearchHit, SearchHits, SearchIndex,
    SearchRequest,
};

/// Settings and mappings for a new index. `type` and the identifier fields
/// are keywords so that `terms` filters match the stored labels exactly.
const INDEX_SETTINGS: &str = include_str!("../resources/index-settings.json");

/// Elasticsearch index holding normalized authority documents.
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Url,
    index_name: String,
    default_window: usize,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<BulkResponseItem>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    #[serde(alias = "create")]
    index: Option<BulkAction>,
}

#[derive(Debug, Deserialize)]
struct BulkAction {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    error: Option<Value>,
}

impl ElasticsearchIndex {
    /// Create a client for the configured cluster and index.
    pub fn new(config: &IndexConfig) -> GndResult<Self> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            GndError::Configuration(format!("Invalid index URL '{}': {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GndError::Configuration(format!(
                "Index URL '{}' cannot be a base URL",
                config.url
            )));
        }
        if config.index_name.trim().is_empty() {
            return Err(GndError::Configuration(
                "Index name must not be empty".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| GndError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            index_name: config.index_name.clone(),
            default_window: config.default_window,
        })
    }

    /// URL of `{base}/{index}/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> GndResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GndError::Configuration(format!(
                    "Index URL '{}' cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&self.index_name)
            .extend(segments);
        Ok(url)
    }
}

/// Parsed body of the bundled index settings.
pub fn index_settings() -> GndResult<Value> {
    Ok(serde_json::from_str(INDEX_SETTINGS)?)
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn create_index(&self) -> GndResult<()> {
        let response = self
            .client
            .put(self.endpoint(&[])?)
            .json(&index_settings()?)
            .send()
            .await
            .map_err(|e| transport_error("Create index request failed", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            if !body.contains("resource_already_exists_exception") {
                tracing::warn!(status, body = %body, "Failed to create index");
                return Err(GndError::from_http_status(
                    status,
                    &format!("Failed to create index: {}", body),
                ));
            }
            tracing::debug!(index = %self.index_name, "Index already exists");
            return Ok(());
        }

        tracing::info!(index = %self.index_name, "Created index");
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> GndResult<SearchHits> {
        let body = search_body(&request, self.default_window);
        tracing::debug!(index = %self.index_name, body = %body, "Searching");

        let response = self
            .client
            .post(self.endpoint(&["_search"])?)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Search request failed", e))?;
        if !response.status().is_success() {
            return Err(status_error("Search failed", response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GndError::parse(format!("Failed to parse search response: {}", e)))?;
        parse_search_response(&body)
    }

    async fn get(&self, id: &str) -> GndResult<Option<Value>> {
        if id.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.endpoint(&["_doc", id])?)
            .send()
            .await
            .map_err(|e| transport_error("Get request failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error("Get failed", response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GndError::parse(format!("Failed to parse document: {}", e)))?;
        Ok(parse_get_response(body))
    }

    async fn bulk_index(&self, documents: Vec<IndexDocument>) -> GndResult<Vec<BulkItemResult>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let body = bulk_body(&documents)?;

        let response = self
            .client
            .post(self.endpoint(&["_bulk"])?)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error("Bulk request failed", e))?;
        if !response.status().is_success() {
            return Err(status_error("Bulk indexing failed", response).await);
        }

        let body: BulkResponse = response
            .json()
            .await
            .map_err(|e| GndError::parse(format!("Failed to parse bulk response: {}", e)))?;
        Ok(bulk_results(&ids, body))
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }
}

/// Search body for a request.
///
/// The main query goes into `must`; the auxiliary query only adds score
/// through `should`, unless there is no main query, in which case it must
/// match.
pub fn search_body(request: &SearchRequest, default_window: usize) -> Value {
    let fields: Vec<String> = request.fields.iter().map(BoostedField::spec).collect();
    let mut must = Vec::new();
    let mut should = Vec::new();

    if let Some(query) = &request.query {
        must.push(json!({
            "query_string": { "query": query, "fields": fields }
        }));
    }
    if let Some(aux) = &request.aux_query {
        let clause = json!({
            "query_string": { "query": aux.query, "boost": aux.boost }
        });
        if request.query.is_some() {
            should.push(clause);
        } else {
            must.push(clause);
        }
    }

    let mut bool_query = Map::new();
    if must.is_empty() {
        must.push(json!({ "match_all": {} }));
    }
    bool_query.insert("must".to_string(), Value::Array(must));
    if !request.filter_types.is_empty() {
        bool_query.insert(
            "filter".to_string(),
            json!([{ "terms": { "type": request.filter_types } }]),
        );
    }
    if !should.is_empty() {
        bool_query.insert("should".to_string(), Value::Array(should));
    }

    json!({
        "from": request.from,
        "size": request.size.unwrap_or(default_window),
        "query": { "bool": bool_query }
    })
}

/// Hits of a search response; `hits.total` may be a number or an object.
pub fn parse_search_response(body: &Value) -> GndResult<SearchHits> {
    let hits = body
        .get("hits")
        .ok_or_else(|| GndError::parse("Search response has no hits"))?;

    let total = match hits.get("total") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        _ => 0,
    };

    let hits = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .map(|hit| SearchHit {
                    id: hit
                        .get("_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    score: hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0),
                    source: hit.get("_source").cloned().unwrap_or_else(|| json!({})),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchHits { total, hits })
}

fn parse_get_response(body: Value) -> Option<Value> {
    if body.get("found").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    match body {
        Value::Object(mut map) => map.remove("_source"),
        _ => None,
    }
}

/// NDJSON body of a bulk request: an action line and a source line per document.
fn bulk_body(documents: &[IndexDocument]) -> GndResult<String> {
    let mut body = String::new();
    for document in documents {
        body.push_str(&serde_json::to_string(
            &json!({ "index": { "_id": document.id } }),
        )?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&document.source)?);
        body.push('\n');
    }
    Ok(body)
}

fn bulk_results(ids: &[String], response: BulkResponse) -> Vec<BulkItemResult> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| {
            let action = response
                .items
                .get(position)
                .and_then(|item| item.index.as_ref());
            match action {
                Some(BulkAction {
                    error: Some(error), ..
                }) => BulkItemResult::failed(id.clone(), describe_error(error)),
                Some(action) if action.status >= 300 => {
                    BulkItemResult::failed(id.clone(), format!("HTTP {}", action.status))
                }
                Some(action) => BulkItemResult::ok(action.id.clone().unwrap_or_else(|| id.clone())),
                None => BulkItemResult::failed(id.clone(), "Missing from bulk response"),
            }
        })
        .collect()
}

fn describe_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(object) => {
            let kind = object.get("type").and_then(Value::as_str);
            let reason = object.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                (Some(kind), None) => kind.to_string(),
                (None, Some(reason)) => reason.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn transport_error(context: &str, e: reqwest::Error) -> GndError {
    let code = if e.is_timeout() {
        ErrorCode::NetTimeout
    } else {
        ErrorCode::NetConnectionFailed
    };
    GndError::Network {
        message: format!("{}: {}", context, e),
        code,
        source: Some(Box::new(e)),
    }
}

async fn status_error(context: &str, response: Response) -> GndError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status, body = %body, "{}", context);
    GndError::from_http_status(status, &format!("{}: {}", context, body))
}
