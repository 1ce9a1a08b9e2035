//! Record → crate entity mappings
//!
//! Each [`EntityMapping`] names a template node by `@id` and lists which of
//! its attributes are filled from the submission record. A source that
//! resolves to nothing (absent, `null`, `""`, `[]`, `{}`) leaves the template
//! value alone.

use crate::graph::CrateGraph;
use mate_record::access::lookup_present;
use mate_record::{FieldMapping, FieldPath, SourceSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Attribute mappings for one template node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    /// Template node to fill
    #[serde(rename = "@id")]
    pub id: String,
    /// Attribute → record source
    #[serde(flatten)]
    pub fields: FieldMapping,
}

impl EntityMapping {
    /// Create empty mapping for a node
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: FieldMapping::new(),
        }
    }

    /// With one attribute mapping
    #[must_use]
    pub fn with_field(mut self, attribute: impl Into<String>, source: Option<SourceSpec>) -> Self {
        self.fields.insert(attribute.into(), source);
        self
    }
}

/// Value for one attribute, or `None` to leave it untouched
fn resolve(record: &Value, source: &SourceSpec, paths: &[FieldPath]) -> Option<Value> {
    if source.is_list() {
        let values: Vec<Value> = paths
            .iter()
            .filter_map(|p| lookup_present(record, p))
            .cloned()
            .collect();
        (!values.is_empty()).then_some(Value::Array(values))
    } else {
        paths.first().and_then(|p| lookup_present(record, p)).cloned()
    }
}

/// Copy record values into the template nodes
///
/// Mappings whose node is not in the graph, or whose source paths do not
/// parse, are skipped with a warning.
#[must_use]
pub fn apply_mappings(mut graph: CrateGraph, record: &Value, mappings: &[EntityMapping]) -> CrateGraph {
    for mapping in mappings {
        let Some(node) = graph.node_mut(&mapping.id) else {
            warn!(id = %mapping.id, "no template node for entity mapping");
            continue;
        };

        for (attribute, source) in &mapping.fields {
            let Some(source) = source else { continue };
            let paths = match source.parsed() {
                Ok(paths) => paths,
                Err(err) => {
                    warn!(id = %mapping.id, attribute = %attribute, error = %err, "bad source path");
                    continue;
                }
            };

            if let Some(value) = resolve(record, source, &paths) {
                debug!(id = %mapping.id, attribute = %attribute, "mapped");
                node.insert(attribute.clone(), value);
            }
        }
    }
    graph
}
