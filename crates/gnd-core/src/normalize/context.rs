//! JSON-LD context: term definitions, prefixes and the default vocabulary.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ErrorCode, GndError, GndResult};

/// Context shipped with the crate.
pub const BUNDLED_CONTEXT: &str = include_str!("../../resources/context.jsonld");

/// Container mapping of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Set,
    List,
}

/// One term definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    pub iri: String,
    pub container: Option<Container>,
    /// Node references compact to plain IRI strings (`"@type": "@id"`).
    pub coerce_id: bool,
}

/// A parsed JSON-LD context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vocab: Option<String>,
    prefixes: BTreeMap<String, String>,
    terms: BTreeMap<String, TermDefinition>,
    /// Expanded IRI to term name; the first term in name order wins.
    reverse: BTreeMap<String, String>,
    /// Keyword aliases such as `id` for `@id`.
    aliases: BTreeMap<String, String>,
}

impl Context {
    /// Parse the bundled context.
    pub fn bundled() -> GndResult<Self> {
        Self::parse(BUNDLED_CONTEXT)
    }

    /// Load a context document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> GndResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GndError::Context {
            message: format!("Failed to read {}: {}", path.display(), e),
            code: ErrorCode::CtxLoadFailed,
        })?;
        Self::parse(&content)
    }

    /// Parse a context document. Both `{"@context": {...}}` and a bare
    /// definition object are accepted.
    pub fn parse(input: &str) -> GndResult<Self> {
        let document: Value = serde_json::from_str(input).map_err(|e| GndError::Context {
            message: format!("Context is not valid JSON: {}", e),
            code: ErrorCode::CtxLoadFailed,
        })?;

        let definitions = match &document {
            Value::Object(map) => match map.get("@context") {
                Some(Value::Object(inner)) => inner,
                Some(_) => return Err(GndError::context("@context must be an object")),
                None => map,
            },
            _ => return Err(GndError::context("Context document must be a JSON object")),
        };

        Self::from_definitions(definitions)
    }

    fn from_definitions(definitions: &Map<String, Value>) -> GndResult<Self> {
        let mut context = Context::default();

        // First pass: vocabulary and prefixes, so term IRIs can use them
        for (key, value) in definitions {
            match (key.as_str(), value) {
                ("@vocab", Value::String(vocab)) => context.vocab = Some(vocab.clone()),
                (k, Value::String(iri)) if !k.starts_with('@') && is_absolute(iri) => {
                    context.prefixes.insert(k.to_string(), iri.clone());
                }
                _ => {}
            }
        }

        for (key, value) in definitions {
            if key.starts_with('@') {
                continue;
            }
            let definition = match value {
                Value::String(iri) => TermDefinition {
                    iri: context.expand_iri(iri),
                    container: None,
                    coerce_id: false,
                },
                Value::Object(map) => {
                    let iri = match map.get("@id") {
                        Some(Value::String(iri)) => context.expand_iri(iri),
                        Some(_) => {
                            return Err(GndError::context(format!(
                                "Term '{}' has a non-string @id",
                                key
                            )))
                        }
                        None => context.expand_iri(key),
                    };
                    let container = match map.get("@container").and_then(Value::as_str) {
                        Some("@set") => Some(Container::Set),
                        Some("@list") => Some(Container::List),
                        _ => None,
                    };
                    let coerce_id = map.get("@type").and_then(Value::as_str) == Some("@id");
                    TermDefinition {
                        iri,
                        container,
                        coerce_id,
                    }
                }
                Value::Null => continue,
                Value::Bool(_) | Value::Number(_) | Value::Array(_) => {
                    return Err(GndError::context(format!(
                        "Unsupported definition for term '{}'",
                        key
                    )))
                }
            };

            if definition.iri.starts_with('@') {
                context.aliases.insert(definition.iri.clone(), key.clone());
            } else {
                context
                    .reverse
                    .entry(definition.iri.clone())
                    .or_insert_with(|| key.clone());
            }
            context.terms.insert(key.clone(), definition);
        }

        Ok(context)
    }

    /// Expand a compact IRI, term or vocabulary-relative name.
    pub fn expand_iri(&self, value: &str) -> String {
        if value.starts_with('@') {
            return value.to_string();
        }
        if let Some(term) = self.terms.get(value) {
            return term.iri.clone();
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if let Some(base) = self.prefixes.get(prefix) {
                return format!("{}{}", base, suffix);
            }
            if suffix.starts_with("//") || prefix == "_" {
                return value.to_string();
            }
        }
        match &self.vocab {
            Some(vocab) => format!("{}{}", vocab, value),
            None => value.to_string(),
        }
    }

    /// Compact a property IRI: exact term, then vocabulary-relative, then
    /// prefixed, else the IRI unchanged.
    pub fn compact_property(&self, iri: &str) -> String {
        if let Some(term) = self.reverse.get(iri) {
            return term.clone();
        }
        self.compact_relative(iri)
    }

    /// Compact a type IRI against the vocabulary.
    pub fn compact_type(&self, iri: &str) -> String {
        self.compact_relative(iri)
    }

    /// Definition of a term, if the context declares one.
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.terms.get(name)
    }

    /// Alias used for a keyword (`@id` → `id`), or the keyword itself.
    pub fn keyword_alias<'a>(&'a self, keyword: &'a str) -> &'a str {
        self.aliases.get(keyword).map(String::as_str).unwrap_or(keyword)
    }

    pub fn vocab(&self) -> Option<&str> {
        self.vocab.as_deref()
    }

    fn compact_relative(&self, iri: &str) -> String {
        if let Some(vocab) = &self.vocab {
            if let Some(rest) = iri.strip_prefix(vocab.as_str()) {
                let simple = !rest.is_empty() && !rest.contains(['/', '#', ':']);
                let collides = self.terms.get(rest).is_some_and(|t| t.iri != iri);
                if simple && !collides {
                    return rest.to_string();
                }
            }
        }
        // Longest matching prefix keeps the suffix shortest
        let best = self
            .prefixes
            .iter()
            .filter(|(_, base)| iri.len() > base.len() && iri.starts_with(base.as_str()))
            .max_by_key(|(_, base)| base.len());
        match best {
            Some((prefix, base)) => format!("{}:{}", prefix, &iri[base.len()..]),
            None => iri.to_string(),
        }
    }
}

fn is_absolute(iri: &str) -> bool {
    iri.contains("://") || iri.starts_with("urn:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GND: &str = "https://d-nb.info/standards/elementset/gnd#";

    #[test]
    fn test_bundled_context() {
        let context = Context::bundled().unwrap();
        assert_eq!(context.vocab(), Some(GND));
        assert_eq!(context.keyword_alias("@id"), "id");
        assert_eq!(context.keyword_alias("@type"), "type");

        let same_as = context.term("sameAs").unwrap();
        assert_eq!(same_as.iri, "http://www.w3.org/2002/07/owl#sameAs");
        assert_eq!(same_as.container, Some(Container::Set));
        assert!(context.term("homepage").unwrap().coerce_id);
    }

    #[test]
    fn test_expand_iri() {
        let context = Context::bundled().unwrap();
        assert_eq!(
            context.expand_iri("gnd:Person"),
            format!("{}Person", GND)
        );
        assert_eq!(context.expand_iri("AuthorityResource"), format!("{}AuthorityResource", GND));
        assert_eq!(
            context.expand_iri("label"),
            "http://www.w3.org/2000/01/rdf-schema#label"
        );
        assert_eq!(
            context.expand_iri("https://d-nb.info/gnd/118540238"),
            "https://d-nb.info/gnd/118540238"
        );
    }

    #[test]
    fn test_compact_property() {
        let context = Context::bundled().unwrap();
        assert_eq!(
            context.compact_property("http://www.w3.org/2002/07/owl#sameAs"),
            "sameAs"
        );
        assert_eq!(
            context.compact_property(&format!("{}preferredName", GND)),
            "preferredName"
        );
        // Not declared as a term but inside the vocabulary
        assert_eq!(context.compact_property(&format!("{}forename", GND)), "forename");
        assert_eq!(
            context.compact_property("http://www.w3.org/2002/07/owl#versionInfo"),
            "owl:versionInfo"
        );
        assert_eq!(
            context.compact_property("http://example.org/x"),
            "http://example.org/x"
        );
    }

    #[test]
    fn test_invalid_context() {
        assert!(matches!(
            Context::parse("[1, 2]"),
            Err(GndError::Context { .. })
        ));
        assert!(matches!(
            Context::parse("{not json"),
            Err(GndError::Context { .. })
        ));
    }
}
