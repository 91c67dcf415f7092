//! RDF to JSON-LD normalization.
//!
//! One authority record at a time runs through expand, type injection,
//! frame, compact and post-processing. The result is a single JSON object
//! with `@context`, `id` (the full entity URI) and `type`, ready to be
//! indexed under the entity's local id.

mod compact;
mod context;
mod expand;
mod frame;

use std::sync::Arc;

use serde_json::{Map, Value};

pub use compact::compact;
pub use context::{Container, Context, TermDefinition, BUNDLED_CONTEXT};
pub use expand::expand;
pub use frame::{frame, inject_type};

use crate::config::{ContextVariant, GndConfig};
use crate::error::{ErrorCode, GndError, GndResult};
use crate::ontology::OntologyStore;
use crate::rdf::{RdfGraph, Resource};

const ABOUT_SUFFIX: &str = "/about";

/// Converts authority record graphs into normalized documents.
#[derive(Clone)]
pub struct Normalizer {
    config: Arc<GndConfig>,
    context: Arc<Context>,
    ontology: Arc<OntologyStore>,
}

impl Normalizer {
    pub fn new(config: Arc<GndConfig>, context: Arc<Context>, ontology: Arc<OntologyStore>) -> Self {
        Self {
            config,
            context,
            ontology,
        }
    }

    pub fn config(&self) -> &GndConfig {
        &self.config
    }

    /// Normalize one entity. Failures are logged and yield `None`.
    pub fn normalize(
        &self,
        entity_id: &str,
        graph: &RdfGraph,
        variant: ContextVariant,
    ) -> Option<Value> {
        match self.try_normalize(entity_id, graph, variant) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(entity_id = %entity_id, error = %e, "Could not normalize record");
                None
            }
        }
    }

    /// Normalize one entity, reporting why it failed.
    pub fn try_normalize(
        &self,
        entity_id: &str,
        graph: &RdfGraph,
        variant: ContextVariant,
    ) -> GndResult<Value> {
        if entity_id.trim().is_empty() {
            return Err(GndError::Conversion {
                message: "Record has no identifier".to_string(),
                code: ErrorCode::ConvMissingId,
                entity_id: None,
            });
        }

        let entity_uri = self.config.entity_uri(entity_id);
        let supertype_iri = self.context.expand_iri(&self.config.supertype);
        let equivalents: Vec<String> = self
            .config
            .supertype_aliases
            .iter()
            .map(|alias| self.context.expand_iri(alias))
            .collect();

        let mut nodes = expand(graph, &self.ontology, &self.config.schema_namespace);
        if !inject_type(&mut nodes, &entity_uri, &supertype_iri, &equivalents) {
            return Err(GndError::missing_node(entity_id));
        }

        let framed = frame(&nodes, &supertype_iri)?;
        let compacted = compact(&framed, &self.context);
        let id_key = self.context.keyword_alias("@id");

        let mut document = match compacted {
            Value::Object(mut map) => match map.remove("@graph") {
                Some(Value::Array(nodes)) => nodes
                    .into_iter()
                    .find_map(|node| match node {
                        Value::Object(node)
                            if node.get(id_key).and_then(Value::as_str)
                                == Some(entity_uri.as_str()) =>
                        {
                            Some(node)
                        }
                        _ => None,
                    })
                    .ok_or_else(|| GndError::missing_node(entity_id))?,
                Some(_) => {
                    return Err(GndError::conversion(entity_id, "@graph is not an array"));
                }
                None => map,
            },
            _ => return Err(GndError::conversion(entity_id, "Compacted document is not an object")),
        };

        if document.get(id_key).and_then(Value::as_str) != Some(entity_uri.as_str()) {
            return Err(GndError::missing_node(entity_id));
        }

        for value in document.values_mut() {
            self.derive_labels(value);
        }
        document.insert(
            "@context".to_string(),
            Value::String(self.config.context_urls.url(variant).to_string()),
        );

        tracing::debug!(entity_id = %entity_id, "Normalized record");
        Ok(Value::Object(document))
    }

    /// Find the identifier of the entity a record describes: the
    /// `gndIdentifier` of a subject in the authority namespace, or else the
    /// only such subject.
    pub fn extract_id(&self, graph: &RdfGraph) -> Option<String> {
        let namespace = self.config.namespace.as_str();
        let identifier_predicate = format!("{}gndIdentifier", self.config.schema_namespace);

        let candidates: Vec<&str> = graph
            .subjects()
            .into_iter()
            .filter_map(Resource::as_iri)
            .filter(|iri| iri.starts_with(namespace) && !iri.ends_with(ABOUT_SUFFIX))
            .collect();

        for subject in &candidates {
            let resource = Resource::Iri(subject.to_string());
            let identifier = graph
                .objects(&resource, &identifier_predicate)
                .find_map(|o| o.as_literal())
                .map(|l| l.value.trim().to_string())
                .filter(|v| !v.is_empty());
            if identifier.is_some() {
                return identifier;
            }
        }

        match candidates.as_slice() {
            [only] => only
                .strip_prefix(namespace)
                .filter(|local| !local.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }

    /// Give embedded objects without a `label` one taken from their
    /// `preferredName` or, for ontology terms, the ontology label.
    fn derive_labels(&self, value: &mut Value) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.derive_labels(item);
                }
            }
            Value::Object(object) => {
                for nested in object.values_mut() {
                    self.derive_labels(nested);
                }
                if !object.contains_key("label") {
                    if let Some(label) = self.label_for(object) {
                        object.insert("label".to_string(), Value::String(label));
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    fn label_for(&self, object: &Map<String, Value>) -> Option<String> {
        let name = match object.get("preferredName") {
            Some(Value::String(name)) => Some(name.clone()),
            Some(Value::Array(names)) => names.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        if name.is_some() {
            return name;
        }

        let id = object.get(self.context.keyword_alias("@id"))?.as_str()?;
        if id.starts_with(&self.config.schema_namespace) && self.ontology.term(id).is_some() {
            return Some(self.ontology.label(id));
        }
        None
    }
}
