//! Data extension: property values of stored documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GndConfig;
use crate::error::GndResult;
use crate::ontology::OntologyStore;
use crate::traits::SearchIndex;
use crate::types::{
    ContentMode, ExtensionRequest, ExtensionResponse, ExtensionValue, PropertyMeta, PropertyRef,
    PropertySettings, ProposedProperties, TypeRef,
};

const ABOUT_SUFFIX: &str = "/about";

/// Resolves data extension requests against the index.
#[derive(Clone)]
pub struct ExtensionResolver {
    index: Arc<dyn SearchIndex>,
    ontology: Arc<OntologyStore>,
    config: Arc<GndConfig>,
}

impl ExtensionResolver {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        ontology: Arc<OntologyStore>,
        config: Arc<GndConfig>,
    ) -> Self {
        Self {
            index,
            ontology,
            config,
        }
    }

    /// Extend every requested entity with every requested property.
    ///
    /// Unknown entities and missing properties yield `[{}]`; only index
    /// failures are errors.
    pub async fn extend(&self, request: &ExtensionRequest) -> GndResult<ExtensionResponse> {
        let meta = request
            .properties
            .iter()
            .map(|property| PropertyMeta {
                id: property.id.clone(),
                name: self.ontology.label(&property.id),
                type_ref: self
                    .ontology
                    .property_type(&property.id)
                    .map(|range| TypeRef::new(range.clone(), self.ontology.label(&range))),
            })
            .collect();

        let mut rows = BTreeMap::new();
        for id in &request.ids {
            let key = id.strip_prefix(&self.config.namespace).unwrap_or(id);
            let document = self.index.get(key).await?;
            if document.is_none() {
                tracing::debug!(entity_id = %id, "Extension requested for unknown entity");
            }

            let row: BTreeMap<String, Vec<ExtensionValue>> = request
                .properties
                .iter()
                .map(|property| {
                    let values = match &document {
                        Some(document) => {
                            self.values(document, &property.id, &property.settings)
                        }
                        None => vec![ExtensionValue::Empty {}],
                    };
                    (property.id.clone(), values)
                })
                .collect();
            rows.insert(id.clone(), row);
        }

        Ok(ExtensionResponse { meta, rows })
    }

    /// Properties offered for extending entities of a type.
    pub fn propose_properties(&self, type_id: &str, limit: Option<usize>) -> ProposedProperties {
        let mut properties: Vec<PropertyRef> = self
            .ontology
            .properties(type_id)
            .into_iter()
            .map(|id| PropertyRef {
                name: self.ontology.label(&id),
                id,
            })
            .collect();
        if let Some(limit) = limit.filter(|l| *l > 0) {
            properties.truncate(limit);
        }
        ProposedProperties {
            type_id: type_id.to_string(),
            properties,
            limit,
        }
    }

    /// Values of one property of a stored document.
    pub fn values(
        &self,
        document: &Value,
        property: &str,
        settings: &PropertySettings,
    ) -> Vec<ExtensionValue> {
        let mut values = Vec::new();
        match document.get(property) {
            Some(Value::Array(items)) => {
                for item in items {
                    self.collect(item, settings.content, &mut values);
                }
            }
            Some(value) => self.collect(value, settings.content, &mut values),
            None => {}
        }

        if values.is_empty() {
            return vec![ExtensionValue::Empty {}];
        }
        if let Some(limit) = settings.limit.filter(|l| *l > 0) {
            values.truncate(limit);
        }
        values
    }

    fn collect(&self, value: &Value, content: ContentMode, out: &mut Vec<ExtensionValue>) {
        match value {
            Value::Null => out.push(ExtensionValue::Empty {}),
            Value::String(s) => out.push(ExtensionValue::str(s.clone())),
            Value::Number(n) => out.push(ExtensionValue::str(n.to_string())),
            Value::Bool(b) => out.push(ExtensionValue::str(b.to_string())),
            Value::Array(items) => {
                for item in items {
                    self.collect(item, content, out);
                }
            }
            Value::Object(object) => {
                let id = object.get("id").and_then(Value::as_str);
                let label = match object.get("label") {
                    Some(Value::String(label)) => Some(label.as_str()),
                    Some(Value::Array(labels)) => labels.first().and_then(Value::as_str),
                    _ => None,
                };

                let local = id.and_then(|id| {
                    id.strip_prefix(&self.config.namespace)
                        .filter(|local| !local.is_empty() && !id.ends_with(ABOUT_SUFFIX))
                });

                let value = match (local, id, label) {
                    (Some(local), Some(id), _) => {
                        ExtensionValue::entity(local, label.unwrap_or(id))
                    }
                    (None, Some(id), _) if content == ContentMode::Id => ExtensionValue::str(id),
                    (None, Some(id), label) => ExtensionValue::str(label.unwrap_or(id)),
                    (None, None, Some(label)) => ExtensionValue::str(label),
                    _ => ExtensionValue::Empty {},
                };
                out.push(value);
            }
        }
    }
}
