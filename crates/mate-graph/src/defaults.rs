//! Fixed root-entity defaults
//!
//! Every model crate is part of the M@TE collection, published by NCI, dated
//! with the run timestamp, and describes itself with the collection's project
//! description.

use crate::error::GraphResult;
use crate::graph::CrateGraph;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// DOI of the M@TE collection
pub const MATE_DOI: &str = "http://dx.doi.org/10.25914/yrzp-g882";

static PROJECT_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)## Project Description\r?\n(.*?)(?:\r?\n## |\z)").expect("valid README section regex")
});

fn nci_record() -> Value {
    json!({
        "@type": "Organization",
        "@id": "https://ror.org/04yx6dh41",
        "name": "National Computational Infrastructure"
    })
}

fn mate_doi() -> String {
    MATE_DOI.to_string()
}

/// Values written onto the root entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootDefaults {
    /// Appended to `isPartOf`
    #[serde(default = "mate_doi")]
    pub collection_id: String,
    /// Replaces `publisher`
    #[serde(default = "nci_record")]
    pub publisher: Value,
}

impl Default for RootDefaults {
    fn default() -> Self {
        Self {
            collection_id: mate_doi(),
            publisher: nci_record(),
        }
    }
}

impl RootDefaults {
    /// Apply the defaults to the `./` node
    ///
    /// `description`, when given, replaces the root description.
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`](crate::GraphError::NodeNotFound) when the
    /// graph has no root entity.
    pub fn apply(&self, mut graph: CrateGraph, timestamp: &str, description: Option<&str>) -> GraphResult<CrateGraph> {
        let root = graph.root_mut()?;

        let collection = Value::String(self.collection_id.clone());
        let is_part_of = match root.remove("isPartOf") {
            None | Some(Value::Null) => vec![collection],
            Some(Value::Array(mut items)) => {
                if !items.contains(&collection) {
                    items.push(collection);
                }
                items
            }
            Some(single) if single == collection => vec![single],
            Some(single) => vec![single, collection],
        };
        root.insert("isPartOf".into(), Value::Array(is_part_of));
        root.insert("publisher".into(), self.publisher.clone());
        root.insert("datePublished".into(), json!(timestamp));
        if let Some(description) = description {
            root.insert("description".into(), json!(description));
        }

        Ok(graph)
    }
}

/// Text of the `## Project Description` section of a README
#[must_use]
pub fn extract_project_description(readme: &str) -> Option<String> {
    PROJECT_DESCRIPTION
        .captures(readme)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
