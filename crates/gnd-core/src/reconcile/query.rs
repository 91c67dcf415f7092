//! Reconciliation query to index search request.

use std::sync::Arc;

use crate::ontology::{local_name, OntologyStore};
use crate::traits::{AuxQuery, BoostedField, SearchRequest};
use crate::types::ReconciliationQuery;

use super::clauses::{join_clauses, property_clauses};
use super::preprocess::preprocess;

/// Boost of the property-matching sub-query.
pub const AUX_QUERY_BOOST: f32 = 5.0;

/// Fields searched by the main query, in order.
pub fn boosted_fields() -> Vec<BoostedField> {
    let mut fields = vec![
        BoostedField::new("preferredName", 4.0),
        BoostedField::new("variantName", 2.0),
    ];
    fields.extend(
        [
            "abbreviatedName",
            "temporaryName",
            "realName.label",
            "pseudonym.label",
            "preferredNameEntityForThePerson.forename",
            "preferredNameEntityForThePerson.surname",
            "gndIdentifier",
            "oldAuthorityNumber",
            "sameAs.id",
            "id",
        ]
        .into_iter()
        .map(|name| BoostedField::new(name, 1.0)),
    );
    fields
}

/// Builds search requests from reconciliation queries.
#[derive(Clone)]
pub struct QueryBuilder {
    ontology: Arc<OntologyStore>,
}

impl QueryBuilder {
    pub fn new(ontology: Arc<OntologyStore>) -> Self {
        Self { ontology }
    }

    /// Build the search request, or `None` when there is nothing to search for.
    pub fn build(&self, query: &ReconciliationQuery) -> Option<SearchRequest> {
        let text = query.query.trim();
        let clauses = property_clauses(&query.properties, &self.ontology);
        let aux_query = join_clauses(&clauses).map(|query| AuxQuery {
            query,
            boost: AUX_QUERY_BOOST,
        });

        let main = if text.is_empty() {
            None
        } else {
            Some(preprocess(text)).filter(|q| !q.is_empty())
        };
        if main.is_none() && aux_query.is_none() {
            return None;
        }

        Some(SearchRequest {
            query: main,
            fields: boosted_fields(),
            filter_types: self.filter_types(&query.types),
            aux_query,
            from: 0,
            size: query.limit.filter(|limit| *limit > 0),
        })
    }

    /// Build a prefix search for entity suggestions.
    pub fn build_prefix(
        &self,
        prefix: &str,
        types: &[String],
        limit: Option<usize>,
    ) -> Option<SearchRequest> {
        let cleaned = preprocess(prefix);
        if cleaned.is_empty() {
            return None;
        }
        // A single bare word also matches as a prefix
        let single_word = !cleaned.contains(char::is_whitespace)
            && cleaned.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '.');
        let query = if single_word {
            format!("{} OR {}*", cleaned, cleaned)
        } else {
            cleaned
        };

        Some(SearchRequest {
            query: Some(query),
            fields: boosted_fields(),
            filter_types: self.filter_types(types),
            aux_query: None,
            from: 0,
            size: limit.filter(|limit| *limit > 0),
        })
    }

    /// Requested types plus their subclasses, so a `Person` filter also
    /// admits documents typed `DifferentiatedPerson`.
    pub fn filter_types(&self, types: &[String]) -> Vec<String> {
        let mut filter: Vec<String> = Vec::new();
        for requested in types {
            let name = local_name(requested);
            if name.is_empty() {
                continue;
            }
            let expanded = if self.ontology.is_class(name) {
                self.ontology.descendants(name).into_iter().collect()
            } else {
                vec![name.to_string()]
            };
            for type_name in expanded {
                if !filter.contains(&type_name) {
                    filter.push(type_name);
                }
            }
        }
        filter
    }
}
