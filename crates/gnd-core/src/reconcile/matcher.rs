//! Candidate ranking and the match decision.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GndConfig;
use crate::error::GndResult;
use crate::ontology::OntologyStore;
use crate::traits::{SearchHit, SearchIndex};
use crate::types::{ReconciliationCandidate, ReconciliationQuery, ReconciliationResponse, TypeRef};

use super::query::QueryBuilder;

/// Minimum score of an automatic match (exclusive).
pub const MATCH_THRESHOLD: f64 = 50.0;

/// Minimum lead of the top candidate over the runner-up.
pub const MATCH_MARGIN: f64 = 5.0;

/// Whether the top of a descending score list is a confident match.
pub fn is_confident_match(scores: &[f64]) -> bool {
    match scores {
        [] => false,
        [top] => *top > MATCH_THRESHOLD,
        [top, second, ..] => *top > MATCH_THRESHOLD && top - second >= MATCH_MARGIN,
    }
}

/// Runs reconciliation queries against the index.
#[derive(Clone)]
pub struct Reconciler {
    index: Arc<dyn SearchIndex>,
    builder: QueryBuilder,
    ontology: Arc<OntologyStore>,
    config: Arc<GndConfig>,
}

impl Reconciler {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        ontology: Arc<OntologyStore>,
        config: Arc<GndConfig>,
    ) -> Self {
        Self {
            index,
            builder: QueryBuilder::new(Arc::clone(&ontology)),
            ontology,
            config,
        }
    }

    /// Ranked candidates for one query. Only the top candidate can be a match.
    pub async fn reconcile(
        &self,
        query: &ReconciliationQuery,
    ) -> GndResult<Vec<ReconciliationCandidate>> {
        let Some(request) = self.builder.build(query) else {
            tracing::debug!("Blank reconciliation query, skipping search");
            return Ok(Vec::new());
        };

        let hits = self.index.search(request).await?;
        tracing::debug!(
            query = %query.query,
            total = hits.total,
            returned = hits.hits.len(),
            "Reconciliation search"
        );

        let mut candidates: Vec<ReconciliationCandidate> =
            hits.hits.iter().map(|hit| self.candidate(hit)).collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            candidates.truncate(limit);
        }

        let scores: Vec<f64> = candidates.iter().map(|c| c.score).collect();
        if is_confident_match(&scores) {
            if let Some(top) = candidates.first_mut() {
                top.matched = true;
            }
        }

        Ok(candidates)
    }

    /// Reconcile a keyed batch; any index failure fails the batch.
    pub async fn reconcile_batch(
        &self,
        queries: &BTreeMap<String, ReconciliationQuery>,
    ) -> GndResult<BTreeMap<String, ReconciliationResponse>> {
        let mut responses = BTreeMap::new();
        for (key, query) in queries {
            let result = self.reconcile(query).await?;
            responses.insert(key.clone(), ReconciliationResponse { result });
        }
        Ok(responses)
    }

    fn candidate(&self, hit: &SearchHit) -> ReconciliationCandidate {
        let id = if hit.id.is_empty() {
            hit.source
                .get("id")
                .and_then(Value::as_str)
                .map(|uri| uri.strip_prefix(&self.config.namespace).unwrap_or(uri))
                .unwrap_or_default()
                .to_string()
        } else {
            hit.id.clone()
        };

        let name = match hit.source.get("preferredName") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Array(names)) => names
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };

        ReconciliationCandidate {
            id,
            name,
            score: hit.score,
            matched: false,
            types: self.top_level_types(&hit.source),
        }
    }

    /// Configured top-level types the document belongs to, directly or
    /// through a subclass.
    fn top_level_types(&self, source: &Value) -> Vec<TypeRef> {
        let hit_types: Vec<&str> = match source.get("type") {
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        };
        let ancestors: Vec<String> = hit_types
            .iter()
            .flat_map(|t| self.ontology.ancestors(t))
            .collect();

        self.config
            .top_level_types
            .iter()
            .filter(|top| ancestors.contains(top))
            .map(|top| TypeRef::new(top.clone(), self.ontology.label(top)))
            .collect()
    }
}
