//! Search index trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GndResult;

/// A field searched by the main query, with its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedField {
    pub name: String,
    pub boost: f32,
}

impl BoostedField {
    pub fn new(name: impl Into<String>, boost: f32) -> Self {
        Self {
            name: name.into(),
            boost,
        }
    }

    /// Field in query-string notation (`preferredName^4`).
    pub fn spec(&self) -> String {
        if (self.boost - 1.0).abs() < f32::EPSILON {
            self.name.clone()
        } else {
            format!("{}^{}", self.name, self.boost)
        }
    }
}

/// Optional sub-query that raises the score of documents matching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxQuery {
    /// Query-string expression.
    pub query: String,
    /// Boost applied to the whole sub-query.
    pub boost: f32,
}

/// Search request sent to the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Main query-string expression; `None` lets the auxiliary query drive the search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Fields searched by the main query.
    pub fields: Vec<BoostedField>,
    /// Documents must carry one of these `type` labels (empty: no filter).
    pub filter_types: Vec<String>,
    /// Property-matching sub-query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux_query: Option<AuxQuery>,
    /// Offset of the first hit.
    pub from: usize,
    /// Maximum number of hits; `None` uses the index default window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index document key (local entity id).
    pub id: String,
    /// Relevance score.
    pub score: f64,
    /// Stored document.
    pub source: serde_json::Value,
}

/// Search hits in descending score order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    /// Total number of matching documents.
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

/// Document to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Document key (local entity id).
    pub id: String,
    pub source: serde_json::Value,
}

/// Outcome of indexing one document in a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Core SearchIndex trait - all search backends implement this.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index with its settings and mappings. An index that
    /// already exists is left as it is.
    async fn create_index(&self) -> GndResult<()>;

    /// Run a weighted search.
    async fn search(&self, request: SearchRequest) -> GndResult<SearchHits>;

    /// Fetch a stored document by local id.
    async fn get(&self, id: &str) -> GndResult<Option<serde_json::Value>>;

    /// Index a batch of documents, reporting the outcome per document.
    async fn bulk_index(&self, documents: Vec<IndexDocument>) -> GndResult<Vec<BulkItemResult>>;

    /// Get the index name.
    fn index_name(&self) -> &str;
}
