//! Link consistency
//!
//! After flattening, every local reference (`#...` or a relative path) must
//! resolve to exactly one top-level node. External IRIs may point outside the
//! crate and are not checked.

use crate::flatten::duplicate_ids;
use crate::graph::CrateGraph;
use serde_json::Value;
use std::collections::HashSet;

/// Problems found by [`check_links`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Ids carried by more than one top-level node
    pub duplicates: Vec<String>,
    /// Local references with no matching node
    pub dangling: Vec<String>,
}

impl LinkReport {
    /// Whether the graph is link-consistent
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.duplicates.is_empty() && self.dangling.is_empty()
    }
}

fn is_local(id: &str) -> bool {
    !id.contains("://") && !id.starts_with("urn:") && !id.starts_with("mailto:")
}

fn references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) if map.len() == 1 => {
            if let Some(id) = map.get("@id").and_then(Value::as_str) {
                out.push(id);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| references(item, out)),
        _ => {}
    }
}

/// Check that references resolve to exactly one node
#[must_use]
pub fn check_links(graph: &CrateGraph) -> LinkReport {
    let ids: HashSet<&str> = graph.ids().collect();

    let mut found = Vec::new();
    for node in graph.nodes() {
        for (key, value) in node {
            if key != "@id" {
                references(value, &mut found);
            }
        }
    }

    let mut dangling: Vec<String> = Vec::new();
    for id in found {
        if is_local(id) && !ids.contains(id) && !dangling.iter().any(|d| d == id) {
            dangling.push(id.to_string());
        }
    }

    LinkReport {
        duplicates: duplicate_ids(graph),
        dangling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_dangling_reference() {
        let graph = CrateGraph::from_document(json!({"@graph": [
            {"@id": "./", "license": {"@id": "#license"}, "isPartOf": [{"@id": "http://dx.doi.org/10.25914/yrzp-g882"}]},
        ]}))
        .unwrap();

        let report = check_links(&graph);
        assert_eq!(report.dangling, vec!["#license".to_string()]);
        assert!(!report.is_consistent());
    }

    #[test]
    fn consistent_graph() {
        let graph = CrateGraph::from_document(json!({"@graph": [
            {"@id": "./", "hasPart": [{"@id": "website_material/"}]},
            {"@id": "website_material/", "@type": "Dataset"}
        ]}))
        .unwrap();
        assert!(check_links(&graph).is_consistent());
    }
}
