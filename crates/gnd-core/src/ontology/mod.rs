//! Ontology lookups: labels, applicable properties and property ranges.

mod store;

pub use store::{local_name, OntologyStore, OntologyTerm, TermKind, BUNDLED_ONTOLOGY};
