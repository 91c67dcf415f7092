//! Typed view over a normalized authority document.

use serde_json::Value;

use crate::error::{GndError, GndResult};

/// A normalized authority record.
///
/// The document keeps the full entity URI in `id`; [`AuthorityResource::id`]
/// is the local identifier used as the index key.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorityResource {
    id: String,
    document: Value,
}

impl AuthorityResource {
    /// Wrap a normalized document. The `id` member must be a URI in `namespace`.
    pub fn from_document(document: Value, namespace: &str) -> GndResult<Self> {
        let uri = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GndError::validation("Document has no id"))?;
        let id = uri
            .strip_prefix(namespace)
            .filter(|local| !local.is_empty())
            .ok_or_else(|| {
                GndError::validation(format!("Document id '{}' is outside {}", uri, namespace))
            })?
            .to_string();
        Ok(Self { id, document })
    }

    /// Local identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full entity URI.
    pub fn uri(&self) -> &str {
        self.document
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Type labels in document order.
    pub fn types(&self) -> Vec<&str> {
        self.strings("type")
    }

    /// Display name: the first `preferredName`.
    pub fn preferred_name(&self) -> Option<&str> {
        self.strings("preferredName").into_iter().next()
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.strings("variantName")
    }

    /// Values of a property, a single value counting as a list of one.
    pub fn values(&self, property: &str) -> Vec<&Value> {
        match self.document.get(property) {
            Some(Value::Array(values)) => values.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value],
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_document(self) -> Value {
        self.document
    }

    fn strings(&self, property: &str) -> Vec<&str> {
        self.values(property)
            .into_iter()
            .filter_map(Value::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NS: &str = "https://d-nb.info/gnd/";

    #[test]
    fn test_typed_view() {
        let resource = AuthorityResource::from_document(
            json!({
                "id": "https://d-nb.info/gnd/118540238",
                "type": ["AuthorityResource", "DifferentiatedPerson"],
                "preferredName": "Goethe, Johann Wolfgang von",
                "variantName": ["Goethe, J. W.", "Gete"]
            }),
            NS,
        )
        .unwrap();

        assert_eq!(resource.id(), "118540238");
        assert_eq!(resource.uri(), "https://d-nb.info/gnd/118540238");
        assert_eq!(resource.types(), vec!["AuthorityResource", "DifferentiatedPerson"]);
        assert_eq!(resource.preferred_name(), Some("Goethe, Johann Wolfgang von"));
        assert_eq!(resource.variant_names().len(), 2);
        assert!(resource.values("dateOfBirth").is_empty());
    }

    #[test]
    fn test_rejects_foreign_id() {
        assert!(AuthorityResource::from_document(json!({"id": "http://viaf.org/viaf/1"}), NS).is_err());
        assert!(AuthorityResource::from_document(json!({"type": ["Work"]}), NS).is_err());
    }
}
