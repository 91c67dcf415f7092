//! Shared fixtures for the gnd-core integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gnd_core::{
    BulkItemResult, Engine, GndConfig, GndError, GndResult, IndexDocument, SearchHit, SearchHits,
    SearchIndex, SearchRequest,
};
use serde_json::{json, Value};

pub const GOETHE_TTL: &str = r#"
@prefix gnd: <https://d-nb.info/standards/elementset/gnd#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<https://d-nb.info/gnd/118540238> a gnd:DifferentiatedPerson ;
    gnd:gndIdentifier "118540238" ;
    gnd:preferredNameForThePerson "Goethe, Johann Wolfgang von" ;
    gnd:variantNameForThePerson "Goethe, J. W. von" , "Gete, Iogann Volfgang" ;
    gnd:preferredNameEntityForThePerson [
        gnd:forename "Johann Wolfgang" ;
        gnd:prefix "von" ;
        gnd:surname "Goethe"
    ] ;
    gnd:dateOfBirth "1749-08-28"^^xsd:date ;
    gnd:dateOfDeath "1832-03-22"^^xsd:date ;
    gnd:placeOfBirth <https://d-nb.info/gnd/4018118-2> ;
    gnd:professionOrOccupation <https://d-nb.info/gnd/4053309-8> ;
    gnd:gender <https://d-nb.info/standards/vocab/gnd/gender#male> ;
    owl:sameAs <http://viaf.org/viaf/24602065> , <http://www.wikidata.org/entity/Q5879> .

<https://d-nb.info/gnd/4018118-2>
    gnd:preferredNameForThePlaceOrGeographicName "Frankfurt am Main" .
"#;

pub const BERLIN_TTL: &str = r#"
@prefix gnd: <https://d-nb.info/standards/elementset/gnd#> .

<https://d-nb.info/gnd/4005728-8> a gnd:TerritorialCorporateBodyOrAdministrativeUnit ;
    gnd:gndIdentifier "4005728-8" ;
    gnd:preferredNameForThePlaceOrGeographicName "Berlin" .
"#;

/// Record without any subject in the authority namespace.
pub const ANONYMOUS_TTL: &str = r#"
@prefix gnd: <https://d-nb.info/standards/elementset/gnd#> .

<http://example.org/thing> gnd:preferredName "Nobody" .
"#;

/// In-memory search index with scripted search results.
#[derive(Default)]
pub struct FakeIndex {
    pub documents: Mutex<BTreeMap<String, Value>>,
    pub hits: Mutex<Vec<SearchHit>>,
    pub requests: Mutex<Vec<SearchRequest>>,
    pub batch_sizes: Mutex<Vec<usize>>,
    /// Documents the index refuses to store.
    pub reject_ids: BTreeSet<String>,
    /// Zero-based bulk call that fails as a whole.
    pub fail_batch: Option<usize>,
    pub fail_search: bool,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, id: &str, document: Value) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(id.to_string(), document);
        self
    }

    /// Script the next search results as `(id, score, preferredName, types)`.
    pub fn with_hits(self, hits: &[(&str, f64, &str, &[&str])]) -> Self {
        *self.hits.lock().unwrap() = hits
            .iter()
            .map(|(id, score, name, types)| SearchHit {
                id: id.to_string(),
                score: *score,
                source: json!({
                    "id": format!("https://d-nb.info/gnd/{}", id),
                    "preferredName": name,
                    "type": types,
                }),
            })
            .collect();
        self
    }

    pub fn rejecting(mut self, id: &str) -> Self {
        self.reject_ids.insert(id.to_string());
        self
    }

    pub fn failing_batch(mut self, call: usize) -> Self {
        self.fail_batch = Some(call);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.documents.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn create_index(&self) -> GndResult<()> {
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> GndResult<SearchHits> {
        let size = request.size.unwrap_or(10);
        self.requests.lock().unwrap().push(request);
        if self.fail_search {
            return Err(GndError::from_http_status(400, "query_shard_exception"));
        }
        let hits: Vec<SearchHit> = self.hits.lock().unwrap().iter().take(size).cloned().collect();
        Ok(SearchHits {
            total: hits.len() as u64,
            hits,
        })
    }

    async fn get(&self, id: &str) -> GndResult<Option<Value>> {
        Ok(self.documents.lock().unwrap().get(id).cloned())
    }

    async fn bulk_index(&self, documents: Vec<IndexDocument>) -> GndResult<Vec<BulkItemResult>> {
        let call = {
            let mut sizes = self.batch_sizes.lock().unwrap();
            sizes.push(documents.len());
            sizes.len() - 1
        };
        if self.fail_batch == Some(call) {
            return Err(GndError::index("cluster_block_exception"));
        }

        let mut stored = self.documents.lock().unwrap();
        Ok(documents
            .into_iter()
            .map(|document| {
                if self.reject_ids.contains(&document.id) {
                    BulkItemResult::failed(document.id, "mapper_parsing_exception")
                } else {
                    let id = document.id.clone();
                    stored.insert(document.id, document.source);
                    BulkItemResult::ok(id)
                }
            })
            .collect())
    }

    fn index_name(&self) -> &str {
        "gnd-test"
    }
}

/// Engine over the bundled ontology and context.
pub fn engine(index: Arc<FakeIndex>) -> Engine {
    Engine::new(GndConfig::default(), index).unwrap()
}

/// A stored document in normalized shape.
pub fn goethe_document() -> Value {
    json!({
        "@context": "https://lobid.org/gnd/context.jsonld",
        "id": "https://d-nb.info/gnd/118540238",
        "type": ["AuthorityResource", "DifferentiatedPerson"],
        "gndIdentifier": "118540238",
        "preferredName": "Goethe, Johann Wolfgang von",
        "variantName": [
            "Gete, Iogann Volfgang",
            "Goethe, J. W. von",
            "Goethe, Iohann Wolfgang von",
            "Goethe, Johann W. von",
            "Goethe, Jean Wolfgang"
        ],
        "dateOfBirth": ["1749-08-28"],
        "placeOfBirth": [
            {"id": "https://d-nb.info/gnd/4018118-2", "label": "Frankfurt am Main"}
        ],
        "professionOrOccupation": [
            {"id": "https://d-nb.info/gnd/4053309-8", "label": "Schriftsteller"},
            {"id": "https://d-nb.info/gnd/4045560-4"}
        ],
        "gender": [
            {"id": "https://d-nb.info/standards/vocab/gnd/gender#male", "label": "Männlich"}
        ],
        "sameAs": [
            {"id": "http://viaf.org/viaf/24602065"},
            {"id": "http://www.wikidata.org/entity/Q5879", "label": "Wikidata"}
        ],
        "wikipediaCount": 42,
        "about": [{"id": "https://d-nb.info/gnd/118540238/about"}],
        "placeholder": [{}]
    })
}
