//! Projection engine
//!
//! Projects a submission record through the presentation table, then applies
//! the finishing rules.

use crate::error::ProjectionResult;
use crate::expand::ProjectionTable;
use crate::finish::{Finisher, FinishingRules};
use crate::frontmatter::render_front_matter;
use crate::project::{project, Projection};
use mate_record::{FieldMapping, SubmissionRecord};
use tracing::{info, warn};

/// Rendered website page
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Finished front matter document
    pub document: serde_json::Value,
    /// Front matter block followed by the page body
    pub page: String,
    /// Unresolved source warnings
    pub warnings: Vec<String>,
}

/// Record to front matter projection
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    table: ProjectionTable,
    finisher: Finisher,
}

impl ProjectionEngine {
    /// Create engine from parsed parts
    #[must_use]
    pub fn new(table: ProjectionTable, finisher: Finisher) -> Self {
        Self { table, finisher }
    }

    /// Create engine from configuration data
    ///
    /// # Errors
    /// Fails on malformed paths in the table or rules.
    pub fn from_config(mapping: &FieldMapping, rules: FinishingRules) -> ProjectionResult<Self> {
        Ok(Self::new(ProjectionTable::from_mapping(mapping)?, Finisher::new(rules)?))
    }

    /// Get projection table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &ProjectionTable {
        &self.table
    }

    /// Project and finish the front matter document
    #[must_use]
    pub fn document(&self, record: &SubmissionRecord, timestamp: &str) -> Projection {
        let Projection { document, warnings } = project(record.as_value(), &self.table);
        for warning in &warnings {
            warn!(%warning, "projection source unresolved");
        }
        Projection {
            document: self.finisher.apply(document, record.as_value(), timestamp),
            warnings,
        }
    }

    /// Render the website page for a record
    ///
    /// # Errors
    /// Fails when the front matter cannot be serialized.
    pub fn render(&self, record: &SubmissionRecord, timestamp: &str, body: &str) -> ProjectionResult<Rendered> {
        let Projection { document, warnings } = self.document(record, timestamp);
        let page = render_front_matter(&document, body)?;
        info!(warnings = warnings.len(), "front matter rendered");
        Ok(Rendered {
            document,
            page,
            warnings,
        })
    }
}
