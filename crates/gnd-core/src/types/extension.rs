//! Data extension protocol types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use super::lenient;
use super::TypeRef;

/// Which form object-valued properties take in extension rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentMode {
    /// The label of the referenced resource.
    #[default]
    Literal,
    /// The identifier of the referenced resource.
    Id,
}

/// Per-property extension settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySettings {
    /// Maximum number of values; 0 or absent means all.
    #[serde(
        default,
        deserialize_with = "lenient::usize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "lenient_content")]
    pub content: ContentMode,
}

fn lenient_content<'de, D>(deserializer: D) -> Result<ContentMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

/// A requested property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionProperty {
    pub id: String,
    #[serde(default)]
    pub settings: PropertySettings,
}

impl ExtensionProperty {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            settings: PropertySettings::default(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.settings.limit = Some(limit);
        self
    }

    pub fn with_content(mut self, content: ContentMode) -> Self {
        self.settings.content = content;
        self
    }
}

/// Data extension request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub properties: Vec<ExtensionProperty>,
}

/// One cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Entity { id: String, name: String },
    Str { str: String },
    Empty {},
}

impl ExtensionValue {
    pub fn entity(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Entity {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str { str: value.into() }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty {})
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMeta {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
}

/// Data extension response: `rows[entity][property]` holds the values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionResponse {
    pub meta: Vec<PropertyMeta>,
    pub rows: BTreeMap<String, BTreeMap<String, Vec<ExtensionValue>>>,
}

/// A property proposed for extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub id: String,
    pub name: String,
}

/// Properties proposed for a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedProperties {
    #[serde(rename = "type")]
    pub type_id: String,
    pub properties: Vec<PropertyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}
