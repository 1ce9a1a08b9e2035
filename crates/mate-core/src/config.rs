//! Crosswalk and runtime configuration
//!
//! The crosswalk (entity mappings, projection table, finishing rules, intake
//! overrides) is versioned data shipped with the binary and loaded once per
//! run. Runtime settings (endpoints, credentials, target repository) come
//! from the command line and environment.

use crate::error::{ConfigError, ConfigResult};
use mate_graph::{EntityMapping, RootDefaults, TemplateUrls};
use mate_intake::{FormLabels, IntakeConfig, RegistryConfig};
use mate_projection::{FinishingRules, ProjectionEngine};
use mate_record::FieldMapping;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const EMBEDDED_CROSSWALK: &str = include_str!("../resources/crosswalk.yaml");

/// Crosswalk schema version this build understands
pub const SUPPORTED_CROSSWALK_VERSION: u32 = 1;

/// Intake overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSection {
    /// Replacement form heading labels
    pub labels: FormLabels,
    /// Upload URL prefixes
    pub asset_prefixes: Option<Vec<String>>,
    /// Field-of-research term for every record
    pub for_codes: Option<Value>,
}

/// Crate graph crosswalk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSection {
    /// Root entity defaults
    #[serde(default)]
    pub defaults: RootDefaults,
    /// Template node mappings
    pub mappings: Vec<EntityMapping>,
}

/// Website page crosswalk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSection {
    /// Target path → record path
    pub table: FieldMapping,
    /// Presentation-schema fixes
    #[serde(default)]
    pub finishing: FinishingRules,
}

/// Fixed links used in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    /// M@TE website
    pub website: String,
    /// Label a submitter adds to ask for review
    pub review_label_url: String,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            website: "https://mate.science/".into(),
            review_label_url: "https://github.com/ModelAtlasofTheEarth/Model_Submission/labels/review%20requested"
                .into(),
        }
    }
}

/// All crosswalk data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crosswalk {
    /// Schema version
    pub version: u32,
    /// Intake overrides
    #[serde(default)]
    pub intake: IntakeSection,
    /// Crate graph crosswalk
    pub graph: GraphSection,
    /// Website page crosswalk
    pub projection: ProjectionSection,
    /// Fixed links
    #[serde(default)]
    pub constants: Constants,
}

impl Crosswalk {
    /// Crosswalk shipped with the binary
    ///
    /// # Errors
    /// Fails only if the embedded resource is corrupt.
    pub fn embedded() -> ConfigResult<Self> {
        Self::from_yaml(EMBEDDED_CROSSWALK)
    }

    /// Parse and version-check a crosswalk
    ///
    /// # Errors
    /// Bad YAML or an unsupported version.
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        let crosswalk: Self = serde_yaml::from_str(text)?;
        if crosswalk.version != SUPPORTED_CROSSWALK_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: crosswalk.version,
                expected: SUPPORTED_CROSSWALK_VERSION,
            });
        }
        debug!(
            mappings = crosswalk.graph.mappings.len(),
            projection_rows = crosswalk.projection.table.len(),
            "crosswalk loaded"
        );
        Ok(crosswalk)
    }

    /// Load a crosswalk file
    ///
    /// # Errors
    /// Unreadable file, bad YAML or an unsupported version.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_yaml(&text)
    }

    /// Intake configuration with the embedded license table
    ///
    /// # Errors
    /// Fails if the license table is corrupt.
    pub fn intake_config(&self) -> ConfigResult<IntakeConfig> {
        let mut config = IntakeConfig::embedded()
            .map_err(|e| ConfigError::Intake(e.to_string()))?
            .with_labels(self.intake.labels.clone());
        if let Some(prefixes) = &self.intake.asset_prefixes {
            config = config.with_asset_prefixes(prefixes.clone());
        }
        if let Some(for_codes) = &self.intake.for_codes {
            config = config.with_for_codes(for_codes.clone());
        }
        Ok(config)
    }

    /// Projection engine for the website page
    ///
    /// # Errors
    /// Malformed paths in the table or finishing rules.
    pub fn projection_engine(&self) -> ConfigResult<ProjectionEngine> {
        Ok(ProjectionEngine::from_config(
            &self.projection.table,
            self.projection.finishing.clone(),
        )?)
    }
}

/// GitHub targets of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// REST API root
    pub api_base: String,
    /// API token
    pub token: Option<String>,
    /// `owner/name` of the submission repository holding the issues
    pub submission_repo: String,
    /// Issue being processed
    pub issue_number: Option<u64>,
    /// Owner of the model repository
    pub owner: String,
    /// Model repository name
    pub repo: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            token: None,
            submission_repo: "ModelAtlasofTheEarth/Model_Submission".into(),
            issue_number: None,
            owner: "ModelAtlasofTheEarth".into(),
            repo: None,
        }
    }
}

/// Runtime settings for one invocation
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Registry endpoints and request policy
    pub registry: RegistryConfig,
    /// Crate template locations
    pub templates: TemplateUrls,
    /// GitHub targets
    pub github: GitHubConfig,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With request timeout applied to every client
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.registry = self.registry.with_timeout_secs(secs);
        self.templates.timeout_secs = secs;
        self
    }

    /// With GitHub token, shared with the repository-name check
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.registry = self.registry.with_github_token(token.clone());
        self.github.token = token;
        self
    }

    /// With model repository owner
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        self.registry = self.registry.with_owner(owner.clone());
        self.github.owner = owner;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mate_intake::FormField;
    use mate_record::SourceSpec;

    #[test]
    fn embedded_crosswalk_loads() {
        let crosswalk = Crosswalk::embedded().unwrap();
        assert_eq!(crosswalk.version, SUPPORTED_CROSSWALK_VERSION);

        let ids: Vec<&str> = crosswalk.graph.mappings.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["./", "model_inputs", "model_outputs", "website_material", "#datasetCreation"]
        );
        assert_eq!(
            crosswalk.graph.mappings[0].fields.get("creator"),
            Some(&Some(SourceSpec::from("creators")))
        );
        assert_eq!(crosswalk.graph.mappings[0].fields.get("publisher"), Some(&None));
        assert_eq!(
            crosswalk.graph.mappings[4].fields.get("instrument"),
            Some(&Some(SourceSpec::from(vec!["software", "computer_uri"])))
        );
        assert_eq!(crosswalk.graph.defaults, RootDefaults::default());
        assert_eq!(crosswalk.projection.finishing, FinishingRules::default());
    }

    #[test]
    fn embedded_crosswalk_builds_engines() {
        let crosswalk = Crosswalk::embedded().unwrap();
        let engine = crosswalk.projection_engine().unwrap();
        assert_eq!(engine.table().len(), crosswalk.projection.table.len());

        let intake = crosswalk.intake_config().unwrap();
        assert_eq!(intake.asset_prefixes.len(), 2);
        assert_eq!(intake.labels.label(FormField::Slug), "-> slug");
    }

    #[test]
    fn crosswalk_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.yaml");
        std::fs::write(&path, EMBEDDED_CROSSWALK).unwrap();

        assert_eq!(Crosswalk::load(&path).unwrap(), Crosswalk::embedded().unwrap());
        assert!(matches!(
            Crosswalk::load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn unsupported_version_rejected() {
        let yaml = "version: 2\ngraph:\n  mappings: []\nprojection:\n  table: {}\n";
        assert!(matches!(
            Crosswalk::from_yaml(yaml),
            Err(ConfigError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn bad_projection_path_is_a_config_error() {
        let yaml = "version: 1\ngraph:\n  mappings: []\nprojection:\n  table:\n    \"a..b\": title\n";
        let crosswalk = Crosswalk::from_yaml(yaml).unwrap();
        assert!(matches!(crosswalk.projection_engine(), Err(ConfigError::Projection(_))));
    }

    #[test]
    fn shared_settings_reach_every_client() {
        let config = PipelineConfig::new()
            .with_timeout_secs(3)
            .with_token(Some("t".into()))
            .with_owner("someone");
        assert_eq!(config.registry.timeout_secs, 3);
        assert_eq!(config.templates.timeout_secs, 3);
        assert_eq!(config.registry.github_token.as_deref(), Some("t"));
        assert_eq!(config.github.owner, "someone");
        assert_eq!(config.registry.owner, "someone");
    }
}
