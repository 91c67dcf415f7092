//! Read-only label store built from the ontology description.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{ErrorCode, GndError, GndResult};
use crate::rdf::{RdfGraph, RdfSyntax, RdfTerm, Resource, RDF_TYPE};

const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
const OWL: &str = "http://www.w3.org/2002/07/owl#";
const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

const LITERAL_RANGES: &[&str] = &[
    "http://www.w3.org/2000/01/rdf-schema#Literal",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#PlainLiteral",
];

const CLASS_TYPES: &[&str] = &[
    "http://www.w3.org/2002/07/owl#Class",
    "http://www.w3.org/2000/01/rdf-schema#Class",
];

const PROPERTY_TYPES: &[&str] = &[
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property",
    "http://www.w3.org/2002/07/owl#ObjectProperty",
    "http://www.w3.org/2002/07/owl#DatatypeProperty",
    "http://www.w3.org/2002/07/owl#AnnotationProperty",
];

/// Ontology description shipped with the crate.
pub const BUNDLED_ONTOLOGY: &str = include_str!("../../resources/gnd-ontology.ttl");

/// Whether a term is a class or a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Class,
    Property,
}

/// One class or property of the ontology.
#[derive(Debug, Clone)]
pub struct OntologyTerm {
    pub iri: String,
    pub kind: TermKind,
    pub label: Option<String>,
    /// Local names of domain classes (empty: applies to every type).
    pub domains: BTreeSet<String>,
    /// Local name of the range class, `None` for literal ranges.
    pub range: Option<String>,
    pub super_properties: BTreeSet<String>,
    pub super_classes: BTreeSet<String>,
}

/// Strip a namespace, prefix or fragment marker from an identifier.
///
/// `https://d-nb.info/standards/elementset/gnd#Person`, `gnd:Person`,
/// `#Person` and `Person` all yield `Person`.
pub fn local_name(identifier: &str) -> &str {
    let trimmed = identifier.trim();
    match trimmed.rfind(['#', '/', ':']) {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Class and property lookup table keyed by local name.
///
/// Built once and shared behind an `Arc`; there are no mutating methods.
#[derive(Debug, Clone)]
pub struct OntologyStore {
    terms: BTreeMap<String, OntologyTerm>,
}

impl OntologyStore {
    /// Load the ontology bundled with the crate.
    pub fn bundled() -> GndResult<Self> {
        Self::load(BUNDLED_ONTOLOGY, RdfSyntax::Turtle)
    }

    /// Load an ontology file; the syntax is derived from the extension.
    pub fn from_file(path: impl AsRef<Path>) -> GndResult<Self> {
        let path = path.as_ref();
        let syntax = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(RdfSyntax::from_extension)
            .ok_or_else(|| {
                GndError::ontology(format!(
                    "Cannot determine RDF syntax of ontology file {}",
                    path.display()
                ))
            })?;
        let content = std::fs::read_to_string(path).map_err(|e| GndError::Ontology {
            message: format!("Failed to read {}: {}", path.display(), e),
            code: ErrorCode::OntLoadFailed,
            source: Some(Box::new(e)),
        })?;
        Self::load(&content, syntax)
    }

    /// Parse an ontology description.
    pub fn load(input: &str, syntax: RdfSyntax) -> GndResult<Self> {
        let graph = RdfGraph::parse(input, syntax, None).map_err(|e| GndError::Ontology {
            message: format!("Failed to parse ontology: {}", e),
            code: ErrorCode::OntLoadFailed,
            source: Some(Box::new(e)),
        })?;
        Self::from_graph(&graph)
    }

    /// Build the store from parsed triples.
    pub fn from_graph(graph: &RdfGraph) -> GndResult<Self> {
        let mut terms: BTreeMap<String, OntologyTerm> = BTreeMap::new();

        for triple in graph.triples() {
            let Resource::Iri(iri) = &triple.subject else {
                continue;
            };
            if triple.predicate != RDF_TYPE {
                continue;
            }
            let kind = match triple.object.as_iri() {
                Some(t) if CLASS_TYPES.contains(&t) => TermKind::Class,
                Some(t) if PROPERTY_TYPES.contains(&t) => TermKind::Property,
                _ => continue,
            };
            terms
                .entry(local_name(iri).to_string())
                .or_insert_with(|| OntologyTerm {
                    iri: iri.clone(),
                    kind,
                    label: None,
                    domains: BTreeSet::new(),
                    range: None,
                    super_properties: BTreeSet::new(),
                    super_classes: BTreeSet::new(),
                });
        }

        if terms.is_empty() {
            return Err(GndError::Ontology {
                message: "Ontology declares no classes or properties".to_string(),
                code: ErrorCode::OntEmpty,
                source: None,
            });
        }

        for term in terms.values_mut() {
            let subject = Resource::Iri(term.iri.clone());
            term.label = pick_label(graph, &subject);
            term.domains = class_names(graph, &subject, &format!("{}domain", RDFS));
            term.range = graph
                .objects(&subject, &format!("{}range", RDFS))
                .find_map(|o| o.as_iri())
                .filter(|r| !r.starts_with(XSD) && !LITERAL_RANGES.contains(r))
                .map(|r| local_name(r).to_string());
            term.super_properties = graph
                .objects(&subject, &format!("{}subPropertyOf", RDFS))
                .filter_map(|o| o.as_iri())
                .map(|s| local_name(s).to_string())
                .collect();
            term.super_classes = graph
                .objects(&subject, &format!("{}subClassOf", RDFS))
                .filter_map(|o| o.as_iri())
                .map(|s| local_name(s).to_string())
                .collect();
        }

        tracing::debug!(terms = terms.len(), "Loaded ontology");
        Ok(Self { terms })
    }

    /// Look up a term by any spelling of its identifier.
    pub fn term(&self, identifier: &str) -> Option<&OntologyTerm> {
        self.terms.get(local_name(identifier))
    }

    /// Display label for a class or property, or the identifier itself.
    pub fn label(&self, identifier: &str) -> String {
        self.term(identifier)
            .and_then(|t| t.label.clone())
            .unwrap_or_else(|| identifier.to_string())
    }

    /// Properties applicable to a type, or every property for an empty name.
    pub fn properties(&self, type_name: &str) -> BTreeSet<String> {
        let all = self
            .terms
            .iter()
            .filter(|(_, t)| t.kind == TermKind::Property);

        if type_name.trim().is_empty() {
            return all.map(|(name, _)| name.clone()).collect();
        }

        let ancestors = self.ancestors(local_name(type_name));
        all.filter(|(_, t)| t.domains.is_empty() || !t.domains.is_disjoint(&ancestors))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Declared range class of a property, `None` for literal or undeclared ranges.
    pub fn property_type(&self, property_id: &str) -> Option<String> {
        self.term(property_id)
            .filter(|t| t.kind == TermKind::Property)
            .and_then(|t| t.range.clone())
    }

    /// Transitive super-properties of a property, nearest first.
    pub fn super_properties(&self, property_id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue: Vec<String> = vec![local_name(property_id).to_string()];

        while let Some(current) = queue.pop() {
            let Some(term) = self.terms.get(&current) else {
                continue;
            };
            for parent in &term.super_properties {
                if seen.insert(parent.clone()) {
                    result.push(parent.clone());
                    queue.push(parent.clone());
                }
            }
        }
        result
    }

    /// Full IRI of a term.
    pub fn iri(&self, identifier: &str) -> Option<&str> {
        self.term(identifier).map(|t| t.iri.as_str())
    }

    pub fn is_property(&self, identifier: &str) -> bool {
        self.term(identifier)
            .is_some_and(|t| t.kind == TermKind::Property)
    }

    pub fn is_class(&self, identifier: &str) -> bool {
        self.term(identifier).is_some_and(|t| t.kind == TermKind::Class)
    }

    /// Local names of all classes.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .filter(|(_, t)| t.kind == TermKind::Class)
            .map(|(name, _)| name.as_str())
    }

    /// Classes whose local name or label contains `needle`, case-insensitive.
    pub fn search_classes(&self, needle: &str) -> Vec<(String, String)> {
        let needle = needle.to_lowercase();
        self.classes()
            .filter(|name| self.matches(name, &needle))
            .map(|name| (name.to_string(), self.label(name)))
            .collect()
    }

    /// Properties of a type whose local name or label contains `needle`.
    pub fn search_properties(&self, needle: &str, type_name: &str) -> Vec<(String, String)> {
        let needle = needle.to_lowercase();
        self.properties(type_name)
            .into_iter()
            .filter(|name| self.matches(name, &needle))
            .map(|name| {
                let label = self.label(&name);
                (name, label)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn matches(&self, name: &str, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || name.to_lowercase().contains(needle_lower)
            || self.label(name).to_lowercase().contains(needle_lower)
    }

    /// The class itself and all its transitive superclasses.
    pub fn ancestors(&self, class: &str) -> BTreeSet<String> {
        let mut ancestors = BTreeSet::new();
        let mut queue = vec![local_name(class).to_string()];
        while let Some(current) = queue.pop() {
            if !ancestors.insert(current.clone()) {
                continue;
            }
            if let Some(term) = self.terms.get(&current) {
                queue.extend(term.super_classes.iter().cloned());
            }
        }
        ancestors
    }

    /// The class itself and all its transitive subclasses.
    pub fn descendants(&self, class: &str) -> BTreeSet<String> {
        let class = local_name(class).to_string();
        let mut result = BTreeSet::new();
        result.insert(class.clone());
        let mut queue = vec![class];
        while let Some(current) = queue.pop() {
            for (name, term) in &self.terms {
                if term.kind == TermKind::Class
                    && term.super_classes.contains(&current)
                    && result.insert(name.clone())
                {
                    queue.push(name.clone());
                }
            }
        }
        result
    }
}

/// German label first, then untagged, then any other language.
fn pick_label(graph: &RdfGraph, subject: &Resource) -> Option<String> {
    let predicate = format!("{}label", RDFS);
    let mut labels: Vec<(u8, &str, &str)> = graph
        .objects(subject, &predicate)
        .filter_map(|o| o.as_literal())
        .map(|l| {
            let lang = l.language.as_deref().unwrap_or("");
            let rank = match lang {
                "de" => 0,
                "" => 1,
                _ => 2,
            };
            (rank, lang, l.value.as_str())
        })
        .collect();
    labels.sort();
    labels.first().map(|(_, _, value)| value.to_string())
}

/// Named classes of a domain/range statement, resolving `owl:unionOf` lists.
fn class_names(graph: &RdfGraph, subject: &Resource, predicate: &str) -> BTreeSet<String> {
    let union_of = format!("{}unionOf", OWL);
    let mut names = BTreeSet::new();

    for object in graph.objects(subject, predicate) {
        match object {
            RdfTerm::Node(Resource::Iri(iri)) => {
                names.insert(local_name(iri).to_string());
            }
            RdfTerm::Node(blank @ Resource::Blank(_)) => {
                for head in graph.objects(blank, &union_of).filter_map(|o| o.as_resource()) {
                    names.extend(
                        graph
                            .collection(head)
                            .into_iter()
                            .filter_map(|m| m.as_iri())
                            .map(|m| local_name(m).to_string()),
                    );
                }
            }
            RdfTerm::Literal(_) => {}
        }
    }
    names
}
