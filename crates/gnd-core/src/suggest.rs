//! Suggest services and entity previews.

use std::sync::Arc;

use serde_json::Value;

use crate::config::GndConfig;
use crate::error::GndResult;
use crate::ontology::OntologyStore;
use crate::reconcile::QueryBuilder;
use crate::traits::SearchIndex;
use crate::types::{AuthorityResource, Flyout, SuggestItem};

/// Default number of suggestions.
pub const DEFAULT_SUGGEST_LIMIT: usize = 10;

/// Autocomplete for entities, types and properties.
#[derive(Clone)]
pub struct SuggestService {
    index: Arc<dyn SearchIndex>,
    builder: QueryBuilder,
    ontology: Arc<OntologyStore>,
    config: Arc<GndConfig>,
}

impl SuggestService {
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

    /// Entities whose names start with or contain `prefix`.
    pub async fn suggest_entity(
        &self,
        prefix: &str,
        type_id: Option<&str>,
        limit: Option<usize>,
    ) -> GndResult<Vec<SuggestItem>> {
        let types: Vec<String> = type_id.map(|t| vec![t.to_string()]).unwrap_or_default();
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_SUGGEST_LIMIT);
        let Some(request) = self.builder.build_prefix(prefix, &types, Some(limit)) else {
            return Ok(Vec::new());
        };

        let hits = self.index.search(request).await?;
        Ok(hits
            .hits
            .into_iter()
            .take(limit)
            .map(|hit| {
                let types = self.type_labels(&hit.source);
                SuggestItem {
                    id: hit.id,
                    name: preferred_name(&hit.source),
                    description: (!types.is_empty()).then(|| types.join(", ")),
                }
            })
            .collect())
    }

    /// Top-level types first, then other ontology classes, matching `prefix`.
    pub fn suggest_type(&self, prefix: &str) -> Vec<SuggestItem> {
        let needle = prefix.trim().to_lowercase();
        let mut items: Vec<SuggestItem> = self
            .config
            .top_level_types
            .iter()
            .map(|t| (t.clone(), self.ontology.label(t)))
            .filter(|(id, name)| {
                id.to_lowercase().contains(&needle) || name.to_lowercase().contains(&needle)
            })
            .map(|(id, name)| SuggestItem {
                id,
                name,
                description: None,
            })
            .collect();

        for (id, name) in self.ontology.search_classes(&needle) {
            if !items.iter().any(|item| item.id == id) {
                items.push(SuggestItem {
                    id,
                    name,
                    description: None,
                });
            }
        }
        items
    }

    /// Properties, of `type_id` when given, matching `prefix`.
    pub fn suggest_property(&self, prefix: &str, type_id: Option<&str>) -> Vec<SuggestItem> {
        self.ontology
            .search_properties(prefix.trim(), type_id.unwrap_or_default())
            .into_iter()
            .map(|(id, name)| SuggestItem {
                id,
                name,
                description: None,
            })
            .collect()
    }

    /// HTML preview of an entity, `None` when it is not indexed.
    pub async fn flyout(&self, id: &str) -> GndResult<Option<Flyout>> {
        let key = id.strip_prefix(&self.config.namespace).unwrap_or(id);
        let Some(document) = self.index.get(key).await? else {
            return Ok(None);
        };

        let name = preferred_name(&document);
        let types = self.type_labels(&document);
        let resource = AuthorityResource::from_document(document, &self.config.namespace).ok();
        let dates: Vec<String> = resource
            .as_ref()
            .map(|r| {
                ["dateOfBirth", "dateOfDeath"]
                    .iter()
                    .flat_map(|p| r.values(p))
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut html = format!(
            "<div class=\"gnd-flyout\"><a href=\"{}\"><b>{}</b></a>",
            escape_html(&self.config.view_url_for(key)),
            escape_html(if name.is_empty() { key } else { name.as_str() })
        );
        if !types.is_empty() {
            html.push_str(&format!("<br/><i>{}</i>", escape_html(&types.join(", "))));
        }
        if !dates.is_empty() {
            html.push_str(&format!("<br/>{}", escape_html(&dates.join(" - "))));
        }
        html.push_str("</div>");

        Ok(Some(Flyout {
            id: key.to_string(),
            html,
        }))
    }

    /// Ontology labels of the document's types, supertype excluded.
    fn type_labels(&self, document: &Value) -> Vec<String> {
        let types: Vec<&str> = match document.get("type") {
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        };
        types
            .into_iter()
            .filter(|t| *t != self.config.supertype)
            .map(|t| self.ontology.label(t))
            .collect()
    }
}

fn preferred_name(document: &Value) -> String {
    match document.get("preferredName") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Array(names)) => names
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
