//! Compaction of framed JSON-LD against a context.

use serde_json::{Map, Value};

use super::context::{Container, Context};

/// Compact a framed document. Predicates become terms, `@id`/`@type`
/// become their aliases, literals become lexical strings and blank node
/// identifiers are dropped. Values of `@set`/`@list` terms are always
/// arrays; everything else collapses to a single value when it has one.
pub fn compact(document: &Value, context: &Context) -> Value {
    match document {
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(nodes)) => {
                let mut graph = Map::new();
                graph.insert(
                    "@graph".to_string(),
                    Value::Array(
                        nodes
                            .iter()
                            .filter_map(|n| n.as_object())
                            .map(|n| compact_node(n, context))
                            .collect(),
                    ),
                );
                Value::Object(graph)
            }
            _ => compact_node(map, context),
        },
        Value::Array(nodes) => Value::Array(nodes.iter().map(|n| compact(n, context)).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => document.clone(),
    }
}

fn compact_node(node: &Map<String, Value>, context: &Context) -> Value {
    let mut compacted = Map::new();

    for (key, value) in node {
        match key.as_str() {
            "@id" => {
                if let Some(id) = value.as_str().filter(|id| !id.starts_with("_:")) {
                    compacted.insert(
                        context.keyword_alias("@id").to_string(),
                        Value::String(id.to_string()),
                    );
                }
            }
            "@type" => {
                let alias = context.keyword_alias("@type").to_string();
                let types: Vec<Value> = match value {
                    Value::Array(types) => types
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|t| Value::String(context.compact_type(t)))
                        .collect(),
                    Value::String(t) => vec![Value::String(context.compact_type(t))],
                    _ => Vec::new(),
                };
                let container = context.term(&alias).and_then(|t| t.container);
                if let Some(value) = shape(types, container) {
                    compacted.insert(alias, value);
                }
            }
            _ if key.starts_with('@') => {}
            predicate => {
                let term = context.compact_property(predicate);
                let definition = context.term(&term);
                let coerce_id = definition.is_some_and(|d| d.coerce_id);
                let values: Vec<Value> = match value {
                    Value::Array(values) => values
                        .iter()
                        .filter_map(|v| compact_value(v, context, coerce_id))
                        .collect(),
                    other => compact_value(other, context, coerce_id).into_iter().collect(),
                };
                if let Some(value) = shape(values, definition.and_then(|d| d.container)) {
                    compacted.insert(term, value);
                }
            }
        }
    }

    Value::Object(compacted)
}

fn compact_value(value: &Value, context: &Context, coerce_id: bool) -> Option<Value> {
    match value {
        Value::Object(object) => {
            if let Some(literal) = object.get("@value") {
                return Some(match literal {
                    Value::String(s) => Value::String(s.clone()),
                    Value::Null => return None,
                    other => Value::String(other.to_string()),
                });
            }
            match object.get("@id").and_then(Value::as_str) {
                // Dangling blank node reference
                Some(id) if id.starts_with("_:") && object.len() == 1 => None,
                Some(id) if object.len() == 1 && coerce_id => Some(Value::String(id.to_string())),
                _ => Some(compact_node(object, context)),
            }
        }
        Value::Array(values) => Some(Value::Array(
            values
                .iter()
                .filter_map(|v| compact_value(v, context, coerce_id))
                .collect(),
        )),
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.clone()),
    }
}

fn shape(mut values: Vec<Value>, container: Option<Container>) -> Option<Value> {
    if values.is_empty() {
        return None;
    }
    if container != Some(Container::List) {
        values.sort_by_cached_key(|v| v.to_string());
        values.dedup();
    }
    match (container, values.len()) {
        (None, 1) => values.pop(),
        _ => Some(Value::Array(values)),
    }
}
