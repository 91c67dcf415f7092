//! Reconciliation service manifest.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::GndConfig;
use crate::ontology::OntologyStore;
use crate::types::TypeRef;

/// Protocol versions the service speaks.
pub const PROTOCOL_VERSIONS: &[&str] = &["0.1", "0.2"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSpec {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub service_url: String,
    pub service_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flyout_service_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestSpec {
    pub entity: ServiceEndpoint,
    #[serde(rename = "type")]
    pub type_: ServiceEndpoint,
    pub property: ServiceEndpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendSpec {
    pub propose_properties: ServiceEndpoint,
    pub property_settings: Vec<Value>,
}

/// Metadata a reconciliation client reads before talking to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceManifest {
    pub versions: Vec<String>,
    pub name: String,
    pub identifier_space: String,
    pub schema_space: String,
    pub default_types: Vec<TypeRef>,
    pub view: ViewSpec,
    pub preview: PreviewSpec,
    pub suggest: SuggestSpec,
    pub extend: ExtendSpec,
}

impl ServiceManifest {
    /// Describe the service configured by `config`.
    pub fn new(config: &GndConfig, ontology: &OntologyStore) -> Self {
        let base = config.service_url.trim_end_matches('/').to_string();
        let endpoint = |path: &str, flyout: Option<&str>| ServiceEndpoint {
            service_url: base.clone(),
            service_path: path.to_string(),
            flyout_service_path: flyout.map(str::to_string),
        };

        Self {
            versions: PROTOCOL_VERSIONS.iter().map(|v| v.to_string()).collect(),
            name: config.service_name.clone(),
            identifier_space: config.namespace.clone(),
            schema_space: config.schema_namespace.clone(),
            default_types: config
                .top_level_types
                .iter()
                .map(|t| TypeRef::new(t.clone(), ontology.label(t)))
                .collect(),
            view: ViewSpec {
                url: config.view_url.clone(),
            },
            preview: PreviewSpec {
                url: format!("{}/flyout/entity?id={{{{id}}}}", base),
                width: 430,
                height: 90,
            },
            suggest: SuggestSpec {
                entity: endpoint("/suggest/entity", Some("/flyout/entity?id=${id}")),
                type_: endpoint("/suggest/type", None),
                property: endpoint("/suggest/property", None),
            },
            extend: ExtendSpec {
                propose_properties: endpoint("/properties", None),
                property_settings: vec![
                    json!({
                        "name": "limit",
                        "label": "Limit",
                        "type": "number",
                        "default": 0,
                        "help_text": "Maximum number of values to return per row (0 for no limit)"
                    }),
                    json!({
                        "name": "content",
                        "label": "Content",
                        "type": "select",
                        "default": "literal",
                        "help_text": "Content type: ID or literal",
                        "choices": [
                            {"value": "id", "name": "ID"},
                            {"value": "literal", "name": "Literal"}
                        ]
                    }),
                ],
            },
        }
    }
}
