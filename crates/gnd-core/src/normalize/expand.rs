//! Triples to expanded JSON-LD node objects.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use crate::ontology::OntologyStore;
use crate::rdf::{RdfGraph, RdfTerm, Resource, RDF_TYPE};

#[derive(Default)]
struct NodeBuilder {
    types: BTreeSet<String>,
    properties: BTreeMap<String, BTreeSet<RdfTerm>>,
}

/// Convert a graph into a flattened list of expanded node objects sorted by
/// `@id`. Properties and their values are sorted, so the same graph always
/// expands to the same list.
///
/// Every statement using an ontology property in `schema_namespace` is also
/// stated with each of the property's super-properties.
pub fn expand(graph: &RdfGraph, ontology: &OntologyStore, schema_namespace: &str) -> Vec<Value> {
    let mut nodes: BTreeMap<String, NodeBuilder> = BTreeMap::new();

    for triple in graph.triples() {
        let node = nodes.entry(triple.subject.node_id()).or_default();

        if triple.predicate == RDF_TYPE {
            if let RdfTerm::Node(Resource::Iri(type_iri)) = &triple.object {
                node.types.insert(type_iri.clone());
                continue;
            }
        }

        node.properties
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple.object.clone());

        if let Some(local) = triple.predicate.strip_prefix(schema_namespace) {
            for parent in ontology.super_properties(local) {
                let parent_iri = ontology
                    .iri(&parent)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}{}", schema_namespace, parent));
                node.properties
                    .entry(parent_iri)
                    .or_default()
                    .insert(triple.object.clone());
            }
        }
    }

    nodes
        .into_iter()
        .map(|(id, node)| node_object(id, node))
        .collect()
}

fn node_object(id: String, node: NodeBuilder) -> Value {
    let mut object = Map::new();
    object.insert("@id".to_string(), Value::String(id));
    if !node.types.is_empty() {
        object.insert(
            "@type".to_string(),
            Value::Array(node.types.into_iter().map(Value::String).collect()),
        );
    }
    for (predicate, values) in node.properties {
        object.insert(
            predicate,
            Value::Array(values.iter().map(value_object).collect()),
        );
    }
    Value::Object(object)
}

fn value_object(term: &RdfTerm) -> Value {
    match term {
        RdfTerm::Node(resource) => json!({ "@id": resource.node_id() }),
        RdfTerm::Literal(literal) => {
            let mut object = Map::new();
            object.insert("@value".to_string(), Value::String(literal.value.clone()));
            if let Some(language) = &literal.language {
                object.insert("@language".to_string(), Value::String(language.clone()));
            } else if let Some(datatype) = &literal.datatype {
                if datatype != XSD_STRING {
                    object.insert("@type".to_string(), Value::String(datatype.clone()));
                }
            }
            Value::Object(object)
        }
    }
}

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

#[cfg(test)]
mod tests {
    use super::*;

    const GND: &str = "https://d-nb.info/standards/elementset/gnd#";

    #[test]
    fn test_expand_materializes_super_properties() {
        let ontology = OntologyStore::bundled().unwrap();
        let graph = RdfGraph::default()
            .with_iri(
                "https://d-nb.info/gnd/118540238",
                RDF_TYPE,
                format!("{}DifferentiatedPerson", GND),
            )
            .with_literal(
                "https://d-nb.info/gnd/118540238",
                format!("{}preferredNameForThePerson", GND),
                "Goethe, Johann Wolfgang von",
            );

        let nodes = expand(&graph, &ontology, GND);
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node["@id"], "https://d-nb.info/gnd/118540238");
        assert_eq!(node["@type"][0], format!("{}DifferentiatedPerson", GND));
        assert_eq!(
            node[format!("{}preferredName", GND)][0]["@value"],
            "Goethe, Johann Wolfgang von"
        );
        assert_eq!(
            node[format!("{}preferredNameForThePerson", GND)][0]["@value"],
            "Goethe, Johann Wolfgang von"
        );
    }

    #[test]
    fn test_expand_deduplicates_values() {
        let ontology = OntologyStore::bundled().unwrap();
        let graph = RdfGraph::default()
            .with_literal("http://x/a", format!("{}variantName", GND), "B")
            .with_literal("http://x/a", format!("{}variantName", GND), "A")
            .with_literal("http://x/a", format!("{}variantName", GND), "B");

        let nodes = expand(&graph, &ontology, GND);
        let values = nodes[0][format!("{}variantName", GND)].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["@value"], "A");
    }
}
