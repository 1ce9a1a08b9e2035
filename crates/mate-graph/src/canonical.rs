//! Optional JSON-LD canonicalization
//!
//! A full expand/flatten/compact round trip against the crate context gives a
//! better-normalized document than the flatten pass alone. When such a
//! transform is plugged in and succeeds its output wins; any failure keeps the
//! hand-flattened graph.

use crate::error::GraphResult;
use crate::graph::CrateGraph;
use crate::links::check_links;
use serde_json::Value;
use tracing::{debug, warn};

/// JSON-LD document transform
pub trait Canonicalizer: Send + Sync {
    /// Transform a complete crate document
    ///
    /// # Errors
    /// Any failure; the caller falls back to the untransformed graph.
    fn canonicalize(&self, document: &Value) -> GraphResult<Value>;
}

/// Prefer the canonicalized form, falling back to `graph` unchanged
///
/// Output that is not a crate document, or that breaks link consistency,
/// counts as a failure.
#[must_use]
pub fn canonicalize_or_keep(graph: CrateGraph, canonicalizer: Option<&dyn Canonicalizer>) -> CrateGraph {
    let Some(canonicalizer) = canonicalizer else {
        return graph;
    };

    let transformed = canonicalizer
        .canonicalize(&graph.to_document())
        .and_then(CrateGraph::from_document);

    match transformed {
        Ok(canonical) if check_links(&canonical).is_consistent() => {
            debug!(nodes = canonical.len(), "using canonicalized crate");
            canonical
        }
        Ok(_) => {
            warn!("canonicalized crate is not link-consistent, keeping flattened form");
            graph
        }
        Err(err) => {
            warn!(error = %err, "canonicalization failed, keeping flattened form");
            graph
        }
    }
}
