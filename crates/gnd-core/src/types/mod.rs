//! Core types for gnd.

mod extension;
mod reconcile;
mod resource;
mod suggest;

pub use extension::*;
pub use reconcile::*;
pub use resource::AuthorityResource;
pub use suggest::*;

/// Lenient deserializers for protocol fields clients send in varying shapes.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A count given as a number, a numeric string, or nothing.
    pub fn usize_opt<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// A single string, a list of strings or `{id}` objects, or nothing.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => vec![s],
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Object(mut o) => match o.remove("id") {
                        Some(Value::String(id)) => Some(id),
                        _ => None,
                    },
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect())
    }
}
