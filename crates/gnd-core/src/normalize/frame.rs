//! Type injection and framing over expanded node objects.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ErrorCode, GndError, GndResult};

/// Append `supertype` to the `@type` list of the node identified by
/// `entity_uri`. Nothing is added when any of `equivalents` (or the
/// supertype itself) is already present. Returns whether the node was found.
pub fn inject_type(
    nodes: &mut [Value],
    entity_uri: &str,
    supertype: &str,
    equivalents: &[String],
) -> bool {
    let Some(Value::Object(node)) = nodes
        .iter_mut()
        .find(|n| n.get("@id").and_then(Value::as_str) == Some(entity_uri))
    else {
        return false;
    };

    let types = node
        .entry("@type")
        .or_insert_with(|| Value::Array(Vec::new()));
    match types {
        Value::Array(list) => {
            let present = list.iter().any(|t| match t.as_str() {
                Some(t) => t == supertype || equivalents.iter().any(|e| e == t),
                None => false,
            });
            if !present {
                list.push(Value::String(supertype.to_string()));
            }
        }
        Value::String(single) => {
            let existing = std::mem::take(single);
            let mut list = vec![Value::String(existing.clone())];
            if existing != supertype && !equivalents.contains(&existing) {
                list.push(Value::String(supertype.to_string()));
            }
            *types = Value::Array(list);
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => {
            *types = Value::Array(vec![Value::String(supertype.to_string())]);
        }
    }
    true
}

/// Select every node typed with `frame_type` and embed the nodes they
/// reference. A single match is returned as the node itself, several as
/// `{"@graph": [...]}` in `@id` order.
///
/// A node already embedded on the current path stays a reference.
pub fn frame(nodes: &[Value], frame_type: &str) -> GndResult<Value> {
    let index: BTreeMap<&str, &Map<String, Value>> = nodes
        .iter()
        .filter_map(|n| match n {
            Value::Object(map) => map
                .get("@id")
                .and_then(Value::as_str)
                .map(|id| (id, map)),
            _ => None,
        })
        .collect();

    let mut roots: Vec<Value> = index
        .iter()
        .filter(|(_, node)| has_type(node, frame_type))
        .map(|(id, node)| {
            let mut path = vec![id.to_string()];
            embed(node, &index, &mut path)
        })
        .collect();

    match roots.len() {
        0 => Err(GndError::Conversion {
            message: format!("No node typed {} to frame", frame_type),
            code: ErrorCode::ConvMissingNode,
            entity_id: None,
        }),
        1 => Ok(roots.remove(0)),
        _ => {
            let mut graph = Map::new();
            graph.insert("@graph".to_string(), Value::Array(roots));
            Ok(Value::Object(graph))
        }
    }
}

fn has_type(node: &Map<String, Value>, frame_type: &str) -> bool {
    match node.get("@type") {
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(frame_type)),
        Some(Value::String(t)) => t == frame_type,
        _ => false,
    }
}

fn embed(
    node: &Map<String, Value>,
    index: &BTreeMap<&str, &Map<String, Value>>,
    path: &mut Vec<String>,
) -> Value {
    let mut framed = Map::new();
    for (key, value) in node {
        let value = match (key.starts_with('@'), value) {
            (false, Value::Array(values)) => Value::Array(
                values
                    .iter()
                    .map(|v| embed_value(v, index, path))
                    .collect(),
            ),
            _ => value.clone(),
        };
        framed.insert(key.clone(), value);
    }
    Value::Object(framed)
}

fn embed_value(
    value: &Value,
    index: &BTreeMap<&str, &Map<String, Value>>,
    path: &mut Vec<String>,
) -> Value {
    let Value::Object(reference) = value else {
        return value.clone();
    };
    let Some(id) = reference.get("@id").and_then(Value::as_str) else {
        return value.clone();
    };
    if reference.len() != 1 || path.iter().any(|p| p == id) {
        return value.clone();
    }
    match index.get(id) {
        Some(target) => {
            path.push(id.to_string());
            let embedded = embed(target, index, path);
            path.pop();
            embedded
        }
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SUPER: &str = "https://d-nb.info/standards/elementset/gnd#AuthorityResource";

    #[test]
    fn test_inject_type_appends_once() {
        let mut nodes = vec![json!({"@id": "http://x/1", "@type": ["http://x/Person"]})];
        assert!(inject_type(&mut nodes, "http://x/1", SUPER, &[]));
        assert!(inject_type(&mut nodes, "http://x/1", SUPER, &[]));
        assert_eq!(nodes[0]["@type"], json!(["http://x/Person", SUPER]));
    }

    #[test]
    fn test_inject_type_respects_equivalents() {
        let mut nodes = vec![json!({"@id": "http://x/1", "@type": ["gnd:AuthorityResource"]})];
        inject_type(
            &mut nodes,
            "http://x/1",
            SUPER,
            &["gnd:AuthorityResource".to_string()],
        );
        assert_eq!(nodes[0]["@type"], json!(["gnd:AuthorityResource"]));
    }

    #[test]
    fn test_inject_type_without_types() {
        let mut nodes = vec![json!({"@id": "http://x/1"})];
        inject_type(&mut nodes, "http://x/1", SUPER, &[]);
        assert_eq!(nodes[0]["@type"], json!([SUPER]));
        assert!(!inject_type(&mut nodes, "http://x/2", SUPER, &[]));
    }

    #[test]
    fn test_frame_embeds_references_without_cycles() {
        let nodes = vec![
            json!({"@id": "http://x/1", "@type": [SUPER], "http://p/knows": [{"@id": "http://x/2"}]}),
            json!({"@id": "http://x/2", "http://p/knows": [{"@id": "http://x/1"}]}),
        ];
        let framed = frame(&nodes, SUPER).unwrap();
        assert_eq!(framed["@id"], "http://x/1");
        assert_eq!(framed["http://p/knows"][0]["@id"], "http://x/2");
        // The back-reference stays a bare reference
        assert_eq!(
            framed["http://p/knows"][0]["http://p/knows"][0],
            json!({"@id": "http://x/1"})
        );
    }

    #[test]
    fn test_frame_multiple_roots() {
        let nodes = vec![
            json!({"@id": "http://x/2", "@type": [SUPER]}),
            json!({"@id": "http://x/1", "@type": [SUPER]}),
        ];
        let framed = frame(&nodes, SUPER).unwrap();
        let graph = framed["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0]["@id"], "http://x/1");
    }

    #[test]
    fn test_frame_without_match() {
        let nodes = vec![json!({"@id": "http://x/1"})];
        assert!(frame(&nodes, SUPER).is_err());
    }
}
