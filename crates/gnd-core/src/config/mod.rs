//! Configuration system for gnd.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

use crate::error::{GndError, GndResult};

/// Default number of documents sent to the index per bulk request.
pub const DEFAULT_BULK_BATCH_SIZE: usize = 1000;

/// Which `@context` URL normalized documents point at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContextVariant {
    #[default]
    Production,
    Development,
}

/// Context URLs written into normalized documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextUrls {
    /// Public context location.
    pub production: String,
    /// Context location of a local deployment.
    pub development: String,
}

impl Default for ContextUrls {
    fn default() -> Self {
        Self {
            production: "https://lobid.org/gnd/context.jsonld".to_string(),
            development: "http://localhost:9000/gnd/context.jsonld".to_string(),
        }
    }
}

impl ContextUrls {
    /// Get the URL for a variant.
    pub fn url(&self, variant: ContextVariant) -> &str {
        match variant {
            ContextVariant::Production => &self.production,
            ContextVariant::Development => &self.development,
        }
    }
}

/// Search index provider type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IndexProvider {
    #[default]
    Elasticsearch,
    Opensearch,
}

/// Search index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Provider type.
    pub provider: IndexProvider,
    /// Base URL of the search cluster.
    pub url: String,
    /// Index holding the authority documents.
    pub index_name: String,
    /// Result window used when a request carries no limit.
    pub default_window: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: IndexProvider::Elasticsearch,
            url: "http://localhost:9200".to_string(),
            index_name: "gnd".to_string(),
            default_window: 10,
            timeout_secs: 30,
        }
    }
}

/// Main gnd configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GndConfig {
    /// Namespace of entity URIs; local ids are the suffix after it.
    pub namespace: String,
    /// Namespace of the ontology (classes and properties).
    pub schema_namespace: String,
    /// Type label injected into every normalized document.
    pub supertype: String,
    /// Other spellings of the supertype that count as already present.
    pub supertype_aliases: Vec<String>,
    /// Context URLs per variant.
    pub context_urls: ContextUrls,
    /// Variant used when converting.
    pub context_variant: ContextVariant,
    /// JSON-LD context file; the bundled context is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_path: Option<PathBuf>,
    /// Ontology description file; the bundled ontology is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontology_path: Option<PathBuf>,
    /// Types offered to reconciliation clients and reported on candidates.
    pub top_level_types: Vec<String>,
    /// Search index configuration.
    pub index: IndexConfig,
    /// Documents per bulk request.
    pub bulk_batch_size: usize,
    /// Reconciliation service name.
    pub service_name: String,
    /// Public base URL of the reconciliation service.
    pub service_url: String,
    /// Entity page template, `{{id}}` is replaced by the local id.
    pub view_url: String,
}

impl Default for GndConfig {
    fn default() -> Self {
        Self {
            namespace: "https://d-nb.info/gnd/".to_string(),
            schema_namespace: "https://d-nb.info/standards/elementset/gnd#".to_string(),
            supertype: "AuthorityResource".to_string(),
            supertype_aliases: vec![
                "gnd:AuthorityResource".to_string(),
                "https://d-nb.info/standards/elementset/gnd#AuthorityResource".to_string(),
            ],
            context_urls: ContextUrls::default(),
            context_variant: ContextVariant::Production,
            context_path: None,
            ontology_path: None,
            top_level_types: [
                "Person",
                "CorporateBody",
                "ConferenceOrEvent",
                "PlaceOrGeographicName",
                "SubjectHeading",
                "Work",
                "Family",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            index: IndexConfig::default(),
            bulk_batch_size: DEFAULT_BULK_BATCH_SIZE,
            service_name: "GND reconciliation for OpenRefine".to_string(),
            service_url: "https://lobid.org/gnd/reconcile".to_string(),
            view_url: "https://lobid.org/gnd/{{id}}".to_string(),
        }
    }
}

impl GndConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> GndResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| GndError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| GndError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| GndError::Configuration(e.to_string()))
            }
            _ => Err(GndError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(namespace) = std::env::var("GND_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Ok(variant) = std::env::var("GND_CONTEXT_VARIANT") {
            config.context_variant = variant.parse().unwrap_or_default();
        }
        if let Ok(path) = std::env::var("GND_CONTEXT_PATH") {
            config.context_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("GND_ONTOLOGY_PATH") {
            config.ontology_path = Some(PathBuf::from(path));
        }

        // Index configuration
        if let Ok(provider) = std::env::var("GND_INDEX_PROVIDER") {
            config.index.provider = provider.parse().unwrap_or_default();
        }
        if let Ok(url) = std::env::var("GND_INDEX_URL") {
            config.index.url = url;
        }
        if let Ok(name) = std::env::var("GND_INDEX_NAME") {
            config.index.index_name = name;
        }
        if let Some(window) = env_usize("GND_INDEX_DEFAULT_WINDOW") {
            config.index.default_window = window;
        }
        if let Some(size) = env_usize("GND_BULK_BATCH_SIZE") {
            config.bulk_batch_size = size;
        }

        if let Ok(url) = std::env::var("GND_SERVICE_URL") {
            config.service_url = url;
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> GndConfigBuilder {
        GndConfigBuilder::default()
    }

    /// Context URL for the configured variant.
    pub fn context_url(&self) -> &str {
        self.context_urls.url(self.context_variant)
    }

    /// Full URI of an entity given its local id.
    pub fn entity_uri(&self, local_id: &str) -> String {
        format!("{}{}", self.namespace, local_id)
    }

    /// Entity page URL for a local id.
    pub fn view_url_for(&self, local_id: &str) -> String {
        self.view_url.replace("{{id}}", local_id)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Builder for GndConfig.
#[derive(Default)]
pub struct GndConfigBuilder {
    config: GndConfig,
}

impl GndConfigBuilder {
    /// Set the entity namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the injected supertype label.
    pub fn supertype(mut self, supertype: impl Into<String>) -> Self {
        self.config.supertype = supertype.into();
        self
    }

    /// Set the context variant.
    pub fn context_variant(mut self, variant: ContextVariant) -> Self {
        self.config.context_variant = variant;
        self
    }

    /// Set the context URLs.
    pub fn context_urls(mut self, urls: ContextUrls) -> Self {
        self.config.context_urls = urls;
        self
    }

    /// Set the context file.
    pub fn context_path(mut self, path: PathBuf) -> Self {
        self.config.context_path = Some(path);
        self
    }

    /// Set the ontology file.
    pub fn ontology_path(mut self, path: PathBuf) -> Self {
        self.config.ontology_path = Some(path);
        self
    }

    /// Set the top-level types.
    pub fn top_level_types(mut self, types: Vec<String>) -> Self {
        self.config.top_level_types = types;
        self
    }

    /// Set index configuration.
    pub fn index(mut self, config: IndexConfig) -> Self {
        self.config.index = config;
        self
    }

    /// Set the bulk batch size.
    pub fn bulk_batch_size(mut self, size: usize) -> Self {
        self.config.bulk_batch_size = size;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GndConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GndConfig::default();
        assert_eq!(config.supertype, "AuthorityResource");
        assert_eq!(config.bulk_batch_size, 1000);
        assert_eq!(config.context_url(), "https://lobid.org/gnd/context.jsonld");
        assert_eq!(config.entity_uri("118540238"), "https://d-nb.info/gnd/118540238");
        assert_eq!(
            config.view_url_for("118540238"),
            "https://lobid.org/gnd/118540238"
        );
    }

    #[test]
    fn test_context_variant_parse() {
        assert_eq!(
            "development".parse::<ContextVariant>().unwrap(),
            ContextVariant::Development
        );
        assert_eq!(
            "Production".parse::<ContextVariant>().unwrap(),
            ContextVariant::Production
        );
        assert!("staging".parse::<ContextVariant>().is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
context_variant = "development"
bulk_batch_size = 250

[index]
url = "http://es.example:9200"
index_name = "gnd-test"
"#
        )
        .unwrap();

        let config = GndConfig::from_file(file.path()).unwrap();
        assert_eq!(config.context_variant, ContextVariant::Development);
        assert_eq!(config.bulk_batch_size, 250);
        assert_eq!(config.index.url, "http://es.example:9200");
        assert_eq!(config.index.index_name, "gnd-test");
        // Unset keys keep their defaults
        assert_eq!(config.index.default_window, 10);
        assert_eq!(config.supertype, "AuthorityResource");
        assert_eq!(
            config.context_url(),
            "http://localhost:9000/gnd/context.jsonld"
        );
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "supertype: Authority\ntop_level_types: [Person]").unwrap();

        let config = GndConfig::from_file(file.path()).unwrap();
        assert_eq!(config.supertype, "Authority");
        assert_eq!(config.top_level_types, vec!["Person".to_string()]);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            GndConfig::from_file(file.path()),
            Err(GndError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = GndConfig::builder()
            .namespace("http://example.org/auth/")
            .context_variant(ContextVariant::Development)
            .bulk_batch_size(10)
            .build();
        assert_eq!(config.entity_uri("x1"), "http://example.org/auth/x1");
        assert_eq!(config.bulk_batch_size, 10);
    }
}
