//! Minimal RDF triple model for single authority records.
//!
//! Source records and the ontology description are parsed with `oxigraph`'s
//! streaming parsers into a flat list of triples. There is no store, no
//! query language and no inference here; the normalizer and the ontology
//! store walk the triples directly.

use std::collections::BTreeSet;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Subject, Term};
use serde::{Deserialize, Serialize};

use crate::error::{GndError, GndResult};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

/// Serialization of an RDF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfSyntax {
    Turtle,
    NTriples,
    RdfXml,
}

impl RdfSyntax {
    /// Guess the syntax from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(Self::Turtle),
            "nt" => Some(Self::NTriples),
            "rdf" | "xml" | "owl" => Some(Self::RdfXml),
            _ => None,
        }
    }

    fn format(self) -> RdfFormat {
        match self {
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
            Self::RdfXml => RdfFormat::RdfXml,
        }
    }
}

/// Subject position: an IRI or a blank node label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Iri(String),
    Blank(String),
}

impl Resource {
    /// Node identifier in JSON-LD form (`_:label` for blank nodes).
    pub fn node_id(&self) -> String {
        match self {
            Resource::Iri(iri) => iri.clone(),
            Resource::Blank(label) => format!("_:{}", label),
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Resource::Iri(iri) => Some(iri),
            Resource::Blank(_) => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub value: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

/// Object position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RdfTerm {
    Node(Resource),
    Literal(Literal),
}

impl RdfTerm {
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            RdfTerm::Node(resource) => resource.as_iri(),
            RdfTerm::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            RdfTerm::Literal(literal) => Some(literal),
            RdfTerm::Node(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            RdfTerm::Node(resource) => Some(resource),
            RdfTerm::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Resource,
    pub predicate: String,
    pub object: RdfTerm,
}

/// An RDF graph as a list of triples.
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    triples: Vec<Triple>,
}

impl RdfGraph {
    /// Parse a document. Any syntax error fails the whole document.
    pub fn parse(input: &str, syntax: RdfSyntax, base_iri: Option<&str>) -> GndResult<Self> {
        let mut parser = RdfParser::from_format(syntax.format());
        if let Some(base) = base_iri {
            parser = parser
                .with_base_iri(base)
                .map_err(|e| GndError::rdf_parse(format!("Invalid base IRI '{}': {}", base, e)))?;
        }

        let mut triples = Vec::new();
        for quad in parser.for_reader(input.as_bytes()) {
            let quad = quad.map_err(|e| GndError::rdf_parse(e.to_string()))?;

            let subject = match quad.subject {
                Subject::NamedNode(node) => Resource::Iri(node.into_string()),
                Subject::BlankNode(node) => Resource::Blank(node.into_string()),
                #[allow(unreachable_patterns)]
                _ => continue,
            };
            let object = match quad.object {
                Term::NamedNode(node) => RdfTerm::Node(Resource::Iri(node.into_string())),
                Term::BlankNode(node) => RdfTerm::Node(Resource::Blank(node.into_string())),
                Term::Literal(literal) => {
                    let (value, datatype, language) = literal.destruct();
                    RdfTerm::Literal(Literal {
                        value,
                        language,
                        datatype: datatype.map(|d| d.into_string()),
                    })
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            };

            triples.push(Triple {
                subject,
                predicate: quad.predicate.into_string(),
                object,
            });
        }

        Ok(Self { triples })
    }

    pub fn from_triples(triples: Vec<Triple>) -> Self {
        Self { triples }
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn push(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Add an IRI-valued triple.
    pub fn with_iri(
        mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        self.triples.push(Triple {
            subject: Resource::Iri(subject.into()),
            predicate: predicate.into(),
            object: RdfTerm::Node(Resource::Iri(object.into())),
        });
        self
    }

    /// Add a plain-literal triple.
    pub fn with_literal(
        mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.triples.push(Triple {
            subject: Resource::Iri(subject.into()),
            predicate: predicate.into(),
            object: RdfTerm::Literal(Literal {
                value: value.into(),
                language: None,
                datatype: None,
            }),
        });
        self
    }

    /// Distinct subjects in sorted order.
    pub fn subjects(&self) -> BTreeSet<&Resource> {
        self.triples.iter().map(|t| &t.subject).collect()
    }

    /// Objects of all triples with the given subject and predicate.
    pub fn objects<'a, 'b>(
        &'a self,
        subject: &'b Resource,
        predicate: &'b str,
    ) -> impl Iterator<Item = &'a RdfTerm> + 'b
    where
        'a: 'b,
    {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Walk an RDF collection (`rdf:first`/`rdf:rest`) starting at `head`.
    pub fn collection(&self, head: &Resource) -> Vec<&RdfTerm> {
        let mut items = Vec::new();
        let mut visited = BTreeSet::new();
        let mut current = head.clone();

        while visited.insert(current.clone()) {
            if current.as_iri() == Some(RDF_NIL) {
                break;
            }
            items.extend(self.objects(&current, RDF_FIRST));
            let next = self
                .objects(&current, RDF_REST)
                .find_map(|rest| rest.as_resource())
                .cloned();
            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        items
    }
}
