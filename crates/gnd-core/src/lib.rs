//! gnd-core - Core library for gnd.
//!
//! This crate converts GND authority records from RDF into normalized
//! JSON-LD documents and answers reconciliation, suggest and data
//! extension requests against a search index holding those documents.
//!
//! # Example
//!
//! ```ignore
//! use gnd_core::{Engine, GndConfig, ReconciliationQuery};
//!
//! let engine = Engine::new(GndConfig::default(), index)?;
//!
//! // Convert a record
//! let graph = RdfGraph::parse(turtle, RdfSyntax::Turtle, None)?;
//! let id = engine.normalizer().extract_id(&graph);
//!
//! // Reconcile a name
//! let candidates = engine
//!     .reconciler()
//!     .reconcile(&ReconciliationQuery::new("Goethe").with_type("Person"))
//!     .await?;
//! ```

pub mod bulk;
pub mod config;
pub mod engine;
pub mod error;
pub mod extension;
pub mod manifest;
pub mod normalize;
pub mod ontology;
pub mod rdf;
pub mod reconcile;
pub mod suggest;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use bulk::{bulk_load, bulk_load_jsonl, convert_record, BulkFailure, BulkStats};
pub use config::{ContextVariant, GndConfig, IndexConfig, IndexProvider};
pub use engine::Engine;
pub use error::{ErrorCode, GndError, GndResult};
pub use extension::ExtensionResolver;
pub use manifest::ServiceManifest;
pub use normalize::{Context, Normalizer};
pub use ontology::OntologyStore;
pub use rdf::{RdfGraph, RdfSyntax};
pub use reconcile::{QueryBuilder, Reconciler};
pub use suggest::SuggestService;
pub use traits::{
    AuxQuery, BoostedField, BulkItemResult, IndexDocument, SearchHit, SearchHits, SearchIndex,
    SearchRequest,
};
pub use types::{
    AuthorityResource, ContentMode, ExtensionProperty, ExtensionRequest, ExtensionResponse,
    ExtensionValue, Flyout, PropertyConstraint, PropertyMeta, PropertySettings,
    ProposedProperties, ReconciliationCandidate, ReconciliationQuery, ReconciliationResponse,
    SuggestItem, SuggestResponse, TypeRef,
};
