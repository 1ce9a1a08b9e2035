//! Crate graph builder
//!
//! Runs the crate pipeline for one submission record:
//!
//! 1. load the template (fatal on failure)
//! 2. assign blank node ids
//! 3. apply the entity mappings
//! 4. flatten to a fixpoint
//! 5. apply the root defaults
//! 6. canonicalize, when a canonicalizer is configured
//!
//! Steps after the template load never abort the build: a failure is logged
//! and the graph as it stood before that step is used.

use crate::blank::assign_blank_ids;
use crate::canonical::{canonicalize_or_keep, Canonicalizer};
use crate::defaults::RootDefaults;
use crate::error::GraphResult;
use crate::flatten::flatten;
use crate::graph::CrateGraph;
use crate::links::check_links;
use crate::mapping::{apply_mappings, EntityMapping};
use crate::templates::TemplateSource;
use mate_record::SubmissionRecord;
use tracing::{info, warn};

/// Builds an RO-Crate graph from a submission record
#[derive(Clone, Copy)]
pub struct GraphBuilder<'a> {
    templates: &'a dyn TemplateSource,
    mappings: &'a [EntityMapping],
    defaults: &'a RootDefaults,
    canonicalizer: Option<&'a dyn Canonicalizer>,
}

impl std::fmt::Debug for GraphBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("mappings", &self.mappings.len())
            .field("defaults", self.defaults)
            .field("canonicalizer", &self.canonicalizer.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> GraphBuilder<'a> {
    /// Create builder
    #[must_use]
    pub fn new(templates: &'a dyn TemplateSource, mappings: &'a [EntityMapping], defaults: &'a RootDefaults) -> Self {
        Self {
            templates,
            mappings,
            defaults,
            canonicalizer: None,
        }
    }

    /// With a canonicalization transform
    #[must_use]
    pub fn with_canonicalizer(mut self, canonicalizer: &'a dyn Canonicalizer) -> Self {
        self.canonicalizer = Some(canonicalizer);
        self
    }

    /// Build the crate graph for a record
    ///
    /// `timestamp` becomes the root `datePublished`.
    ///
    /// # Errors
    /// Template download failures and templates that are not crate documents.
    pub async fn build(&self, record: &SubmissionRecord, timestamp: &str) -> GraphResult<CrateGraph> {
        let template = self.templates.crate_template().await?;
        let graph = CrateGraph::from_document(template)?;
        info!(nodes = graph.len(), "crate template loaded");

        let source = match self.templates.type_templates().await {
            Ok(types) => types.filter(record.as_value().clone()),
            Err(err) => {
                warn!(error = %err, "type templates unavailable, mapping unfiltered record");
                record.as_value().clone()
            }
        };

        let graph = assign_blank_ids(graph);
        let graph = apply_mappings(graph, &source, self.mappings);
        let graph = flatten(graph);

        let description = match self.templates.project_description().await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(error = %err, "project description unavailable");
                None
            }
        };
        let graph = match self.defaults.apply(graph.clone(), timestamp, description.as_deref()) {
            // Defaults can bring inline records back in
            Ok(with_defaults) => flatten(with_defaults),
            Err(err) => {
                warn!(error = %err, "root defaults not applied");
                graph
            }
        };

        let report = check_links(&graph);
        if !report.is_consistent() {
            warn!(
                duplicates = ?report.duplicates,
                dangling = ?report.dangling,
                "crate graph is not link-consistent"
            );
        }

        let graph = canonicalize_or_keep(graph, self.canonicalizer);
        info!(nodes = graph.len(), "crate graph built");
        Ok(graph)
    }
}
