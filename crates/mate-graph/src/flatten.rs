//! Graph flattening
//!
//! Inline objects with more than one key become top-level nodes and are
//! replaced in place by a bare `{"@id": ...}` reference. Promoted nodes can
//! carry inline objects of their own, so passes repeat until the node count
//! stops growing.

use crate::blank::assign_blank_ids;
use crate::graph::{node_id, CrateGraph, Node};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::debug;

/// Promote one inline object; returns the reference to leave in its place
fn promote(inline: &mut Value, known: &mut HashSet<String>, promoted: &mut Vec<Node>) {
    let Value::Object(map) = inline else { return };
    if map.len() <= 1 {
        return;
    }
    let id = match map.get("@id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => return,
    };

    if known.insert(id.clone()) {
        let mut node = map.clone();
        node.insert("@id".into(), Value::String(id.clone()));
        promoted.push(node);
    }
    *inline = json!({ "@id": id });
}

/// Promote the inline objects of an attribute value, at any list depth
fn promote_value(value: &mut Value, known: &mut HashSet<String>, promoted: &mut Vec<Node>) {
    match value {
        Value::Object(_) => promote(value, known, promoted),
        Value::Array(items) => items.iter_mut().for_each(|item| promote_value(item, known, promoted)),
        _ => {}
    }
}

fn flatten_node(node: &mut Node, known: &mut HashSet<String>, promoted: &mut Vec<Node>) {
    for (key, value) in node.iter_mut() {
        if key != "@id" {
            promote_value(value, known, promoted);
        }
    }
}

/// Flatten the graph to a fixpoint
///
/// Blank ids are assigned first so every inline object can be referenced.
#[must_use]
pub fn flatten(graph: CrateGraph) -> CrateGraph {
    let mut graph = assign_blank_ids(graph);
    let mut passes = 0;

    loop {
        passes += 1;
        let start = graph.len();
        let mut known: HashSet<String> = graph.ids().map(str::to_string).collect();

        for i in 0..start {
            let mut promoted = Vec::new();
            flatten_node(&mut graph.nodes_mut()[i], &mut known, &mut promoted);
            for node in promoted {
                graph.push(node);
            }
        }

        if graph.len() == start {
            break;
        }
    }

    debug!(passes, nodes = graph.len(), "graph flattened");
    graph
}

/// Whether any attribute still holds an inline object with more than one key
#[must_use]
pub fn has_inline_objects(graph: &CrateGraph) -> bool {
    fn inline(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.len() > 1,
            Value::Array(items) => items.iter().any(inline),
            _ => false,
        }
    }
    graph
        .nodes()
        .iter()
        .any(|node| node.iter().filter(|(key, _)| key.as_str() != "@id").any(|(_, value)| inline(value)))
}

/// Top-level ids occurring more than once
#[must_use]
pub fn duplicate_ids(graph: &CrateGraph) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in graph.nodes().iter().filter_map(node_id) {
        if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(nodes: Value) -> CrateGraph {
        CrateGraph::from_document(json!({ "@graph": nodes })).unwrap()
    }

    #[test]
    fn promotes_nested_objects_transitively() {
        let flat = flatten(graph(json!([{
            "@id": "./",
            "creator": [{
                "@id": "https://orcid.org/0000-0001-2345-6789",
                "@type": "Person",
                "affiliation": {"@type": "Organization", "name": "ANU"}
            }]
        }])));

        assert_eq!(flat.len(), 3);
        assert_eq!(
            flat.nodes()[0]["creator"],
            json!([{"@id": "https://orcid.org/0000-0001-2345-6789"}])
        );
        assert_eq!(flat.nodes()[1]["affiliation"], json!({"@id": "#b1"}));
        assert_eq!(flat.nodes()[2]["name"], "ANU");
        assert!(!has_inline_objects(&flat));
    }

    #[test]
    fn objects_in_nested_lists_are_promoted() {
        let nested = graph(json!([{"@id": "./", "x": [[{"name": "A", "type": "Person"}]]}]));
        assert!(has_inline_objects(&assign_blank_ids(nested.clone())));

        let flat = flatten(nested);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.nodes()[0]["x"], json!([[{"@id": "#b1"}]]));
        assert_eq!(flat.nodes()[1]["name"], "A");
        assert!(!has_inline_objects(&flat));
    }

    #[test]
    fn existing_nodes_are_not_duplicated() {
        let flat = flatten(graph(json!([
            {"@id": "./", "publisher": {"@id": "https://ror.org/04yx6dh41", "name": "NCI"}},
            {"@id": "https://ror.org/04yx6dh41", "@type": "Organization", "name": "National Computational Infrastructure"}
        ])));

        assert_eq!(flat.len(), 2);
        assert_eq!(flat.nodes()[1]["name"], "National Computational Infrastructure");
        assert!(duplicate_ids(&flat).is_empty());
    }

    #[test]
    fn same_inline_object_twice_is_promoted_once() {
        let person = json!({"@id": "#p", "name": "A"});
        let flat = flatten(graph(json!([{"@id": "./", "creator": [person.clone()], "contributor": [person]}])));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn references_stay_inline() {
        let original = graph(json!([{"@id": "./", "license": {"@id": "#license"}}]));
        assert_eq!(flatten(original.clone()), original);
    }

    #[test]
    fn duplicates_are_reported() {
        let g = graph(json!([{"@id": "a"}, {"@id": "a"}, {"@id": "b"}, {"@id": "a"}]));
        assert_eq!(duplicate_ids(&g), vec!["a".to_string()]);
    }
}
