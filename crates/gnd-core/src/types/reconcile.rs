//! Reconciliation protocol types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// One reconciliation query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationQuery {
    /// Free-text query.
    #[serde(default)]
    pub query: String,
    /// Requested types; a single string is accepted.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub types: Vec<String>,
    /// Maximum number of candidates.
    #[serde(
        default,
        deserialize_with = "lenient::usize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<usize>,
    /// Property constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyConstraint>,
}

impl ReconciliationQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_property(mut self, pid: impl Into<String>, v: Value) -> Self {
        self.properties.push(PropertyConstraint { pid: pid.into(), v });
        self
    }
}

/// A property value the candidate should have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyConstraint {
    pub pid: String,
    /// A string, number, `{"id": ...}` object, or a list of those.
    #[serde(default)]
    pub v: Value,
}

impl PropertyConstraint {
    /// The non-blank values of the constraint as strings.
    pub fn values(&self) -> Vec<String> {
        let mut values = Vec::new();
        collect_values(&self.v, &mut values);
        values
    }
}

fn collect_values(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
        }
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_values(item, out);
            }
        }
        Value::Object(object) => {
            if let Some(id) = object.get("id") {
                collect_values(id, out);
            }
        }
        Value::Null => {}
    }
}

/// A type reference with display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationCandidate {
    /// Local entity id.
    pub id: String,
    pub name: String,
    pub score: f64,
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(rename = "type")]
    pub types: Vec<TypeRef>,
}

/// Candidates for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResponse {
    pub result: Vec<ReconciliationCandidate>,
}
