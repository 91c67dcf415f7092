//! Property constraint clauses.
//!
//! Each constraint value is classified into a [`PropertyShape`] and
//! rendered by that shape's template. All clauses of a query are OR-joined
//! into the auxiliary sub-query.

use crate::ontology::OntologyStore;
use crate::types::PropertyConstraint;

use super::preprocess::preprocess;

/// Fields stored as plain literals, matched directly.
pub const LITERAL_FIELDS: &[&str] = &[
    "gndIdentifier",
    "dateOfBirth",
    "dateOfDeath",
    "dateOfEstablishment",
    "dateOfTermination",
    "dateOfConferenceOrEvent",
    "dateOfProduction",
    "oldAuthorityNumber",
    "biographicalOrHistoricalInformation",
];

/// How a constraint value is matched against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    /// Unknown property: the value as a bare term.
    FreeText,
    /// Literal field: `field:value`.
    Literal,
    /// URI value on an object field: `field.*:"uri"`.
    Uri,
    /// Text value on an object field: `field.*:value`.
    Nested,
}

impl PropertyShape {
    /// Classify a property/value pair.
    pub fn classify(property: &str, value: &str, ontology: &OntologyStore) -> Self {
        if !ontology.is_property(property) {
            Self::FreeText
        } else if property.ends_with("Literal") || LITERAL_FIELDS.contains(&property) {
            Self::Literal
        } else if value.starts_with("http") {
            Self::Uri
        } else {
            Self::Nested
        }
    }

    /// Render the clause for one value.
    pub fn render(self, property: &str, value: &str) -> String {
        match self {
            Self::FreeText => preprocess(value),
            Self::Literal => format!("{}:{}", property, preprocess(value)),
            Self::Uri => format!("{}.*:\"{}\"", property, value.replace('"', "\\\"")),
            Self::Nested => format!("{}.*:{}", property, preprocess(value)),
        }
    }
}

/// Render every non-blank constraint value into a clause.
pub fn property_clauses(properties: &[PropertyConstraint], ontology: &OntologyStore) -> Vec<String> {
    properties
        .iter()
        .filter(|p| !p.pid.trim().is_empty())
        .flat_map(|p| {
            let property = p.pid.trim();
            p.values()
                .into_iter()
                .map(|value| {
                    PropertyShape::classify(property, &value, ontology).render(property, &value)
                })
                .filter(|clause| !clause.trim().is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Group clauses so each keeps its own operator precedence inside the OR.
pub fn join_clauses(clauses: &[String]) -> Option<String> {
    match clauses {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(
            many.iter()
                .map(|c| format!("({})", c))
                .collect::<Vec<_>>()
                .join(" OR "),
        ),
    }
}
