//! Submission pipeline
//!
//! One invocation parses the issue into a record, then builds the two
//! artifacts that depend on it: the RO-Crate and the website page. A crate
//! failure costs only the crate; the page and the report are still produced.

use crate::config::{Constants, Crosswalk};
use crate::error::{ConfigResult, PipelineResult};
use crate::media::{copy_media, MediaSource};
use crate::report::{announcement, crate_failure, readme, submission_comment};
use crate::sink::RepositorySink;
use crate::topics::repository_topics;
use chrono::{DateTime, Utc};
use mate_graph::{CrateGraph, EntityMapping, GraphBuilder, GraphError, RootDefaults, TemplateSource};
use mate_intake::resolve::Collaborators;
use mate_intake::{Assembled, IntakeConfig, RecordAssembler};
use mate_projection::{ProjectionEngine, ProjectionResult, Rendered};
use mate_record::SubmissionRecord;
use tracing::{error, info, warn};

/// Crate file name
pub const CRATE_FILE: &str = "ro-crate-metadata.json";

/// Copy of the crate shipped with the website material
pub const WEBSITE_CRATE_FILE: &str = "website_material/ro-crate-metadata.json";

/// Raw issue body
pub const TRAIL_BODY_FILE: &str = ".metadata_trail/issue_body.md";

/// Extracted issue answers
pub const TRAIL_DICT_FILE: &str = ".metadata_trail/issue_dict.json";

/// Repository README
pub const README_FILE: &str = "README.md";

/// Website page
pub const PAGE_FILE: &str = "website_material/index.md";

/// Format a run timestamp with millisecond precision zeroed
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Everything derived from one issue body
#[derive(Debug)]
pub struct Outputs {
    /// Parsed record, error log and raw answers
    pub assembled: Assembled,
    /// Crate graph, or why it could not be built
    pub graph: Result<CrateGraph, GraphError>,
    /// Website page
    pub page: ProjectionResult<Rendered>,
}

/// What a publish run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Repository paths written, in order
    pub files: Vec<String>,
    /// Whether the crate was written
    pub crate_written: bool,
    /// Topics set on the repository
    pub topics: Vec<String>,
}

/// Issue-to-repository pipeline
pub struct Pipeline<'a> {
    intake: IntakeConfig,
    projection: ProjectionEngine,
    mappings: &'a [EntityMapping],
    defaults: &'a RootDefaults,
    constants: &'a Constants,
    collaborators: Collaborators<'a>,
    templates: &'a dyn TemplateSource,
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("mappings", &self.mappings.len())
            .field("projection_rows", &self.projection.table().len())
            .finish_non_exhaustive()
    }
}

impl<'a> Pipeline<'a> {
    /// Create pipeline from a crosswalk and its collaborators
    ///
    /// # Errors
    /// Fails when the crosswalk's intake or projection sections are invalid.
    pub fn new(
        crosswalk: &'a Crosswalk,
        collaborators: Collaborators<'a>,
        templates: &'a dyn TemplateSource,
    ) -> ConfigResult<Self> {
        Ok(Self {
            intake: crosswalk.intake_config()?,
            projection: crosswalk.projection_engine()?,
            mappings: &crosswalk.graph.mappings,
            defaults: &crosswalk.graph.defaults,
            constants: &crosswalk.constants,
            collaborators,
            templates,
        })
    }

    /// Parse an issue body
    pub async fn parse(&self, body: &str) -> Assembled {
        RecordAssembler::new(&self.intake, self.collaborators).parse_issue(body).await
    }

    /// Build the crate graph for a record
    ///
    /// # Errors
    /// Template failures; see [`GraphBuilder::build`].
    pub async fn build_crate(&self, record: &SubmissionRecord, timestamp: &str) -> Result<CrateGraph, GraphError> {
        let result = GraphBuilder::new(self.templates, self.mappings, self.defaults)
            .build(record, timestamp)
            .await;
        if let Err(err) = &result {
            error!(error = %err, "crate generation failed");
        }
        result
    }

    /// Render the website page for a record
    ///
    /// # Errors
    /// Front matter serialization failures.
    pub fn render_page(&self, record: &SubmissionRecord, timestamp: &str) -> ProjectionResult<Rendered> {
        let body = record.get_str("model_setup_description").unwrap_or_default();
        self.projection.render(record, timestamp, body)
    }

    /// Parse the issue and build both artifacts
    pub async fn outputs(&self, body: &str, timestamp: &str) -> Outputs {
        let assembled = self.parse(body).await;
        let graph = self.build_crate(&assembled.record, timestamp).await;
        let page = self.render_page(&assembled.record, timestamp);
        Outputs { assembled, graph, page }
    }

    /// Post the submission report on the issue
    ///
    /// # Errors
    /// The comment could not be posted.
    pub async fn report(&self, body: &str, sink: &dyn RepositorySink) -> PipelineResult<Assembled> {
        let assembled = self.parse(body).await;
        let comment = submission_comment(&assembled.record, &assembled.log, self.constants);
        sink.create_comment(&comment).await?;
        info!(entries = assembled.log.entries().len(), "submission report posted");
        Ok(assembled)
    }

    /// Publish a submission into its model repository
    ///
    /// Writes the crate, the metadata trail, the README, the website page and
    /// the media, sets the topics and announces the repository.
    ///
    /// # Errors
    /// The first failing repository write or page rendering.
    pub async fn publish(
        &self,
        body: &str,
        timestamp: &str,
        sink: &dyn RepositorySink,
        media: &dyn MediaSource,
        repository: (&str, &str),
    ) -> PipelineResult<PublishSummary> {
        let Outputs { assembled, graph, page } = self.outputs(body, timestamp).await;
        let record = &assembled.record;
        let mut summary = PublishSummary::default();

        match graph {
            Ok(graph) => {
                let crate_json = graph.to_json_pretty()?;
                for path in [CRATE_FILE, WEBSITE_CRATE_FILE] {
                    sink.create_file(path, "add ro-crate", crate_json.as_bytes()).await?;
                    summary.files.push(path.to_string());
                }
                summary.crate_written = true;
            }
            Err(err) => {
                sink.create_comment(&crate_failure(&err.to_string())).await?;
            }
        }

        sink.create_file(TRAIL_BODY_FILE, "add issue_body", body.as_bytes()).await?;
        summary.files.push(TRAIL_BODY_FILE.to_string());
        let answers = serde_json::to_string(&assembled.fields.to_value())?;
        sink.create_file(TRAIL_DICT_FILE, "add issue_dict", answers.as_bytes()).await?;
        summary.files.push(TRAIL_DICT_FILE.to_string());

        let text = readme(record, self.constants);
        match sink.get_contents(README_FILE).await {
            Ok(existing) => {
                sink.update_file(README_FILE, "Updated the README.md", text.as_bytes(), &existing.sha)
                    .await?;
            }
            Err(err) if err.is_not_found() => {
                sink.create_file(README_FILE, "add README.md", text.as_bytes()).await?;
            }
            Err(err) => return Err(err.into()),
        }
        summary.files.push(README_FILE.to_string());

        let page = page?;
        if !page.warnings.is_empty() {
            warn!(count = page.warnings.len(), "website page has unresolved fields");
        }
        sink.create_file(PAGE_FILE, "Add YAML file with front matter", page.page.as_bytes())
            .await?;
        summary.files.push(PAGE_FILE.to_string());

        summary.files.extend(copy_media(record, media, sink).await?);

        summary.topics = repository_topics(record);
        sink.replace_topics(&summary.topics).await?;

        let (owner, repo) = repository;
        sink.create_comment(&announcement(owner, repo)).await?;
        info!(files = summary.files.len(), crate_written = summary.crate_written, "submission published");
        Ok(summary)
    }
}
