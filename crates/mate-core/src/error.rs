//! Error types for pipeline orchestration
//!
//! Configuration errors stop the run before anything is fetched. Sink errors
//! stop publishing at the failing step. Crate-build failures are not here:
//! they only cost the crate artifact and are reported as an issue comment.

use std::path::PathBuf;

/// Errors loading crosswalk or runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Crosswalk YAML did not parse
    #[error("crosswalk yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Crosswalk written for another schema version
    #[error("unsupported crosswalk version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Projection table or finishing rules hold a bad path
    #[error("projection config: {0}")]
    Projection(#[from] mate_projection::ProjectionError),

    /// Intake tables could not be loaded
    #[error("intake config: {0}")]
    Intake(String),

    /// Crosswalk file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors writing to the model repository or the issue
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Path does not exist in the repository
    #[error("not found: {0}")]
    NotFound(String),

    /// Request could not be sent
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// API answered with an error status
    #[error("{url} answered HTTP {status}: {message}")]
    Status { url: String, status: u16, message: String },

    /// Sink lacks the target for this operation
    #[error("{0} is not configured")]
    Unconfigured(&'static str),

    /// Response body was not what the API documents
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl SinkError {
    /// Create transport error
    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create status error
    pub fn status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if the error means the path is absent
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors running the pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration failed to load
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Repository or issue write failed
    #[error("repository error: {0}")]
    Sink(#[from] SinkError),

    /// Crate graph could not be serialized
    #[error("crate error: {0}")]
    Graph(#[from] mate_graph::GraphError),

    /// Front matter could not be rendered
    #[error("projection error: {0}")]
    Projection(#[from] mate_projection::ProjectionError),

    /// Collaborator clients could not be built
    #[error("client error: {0}")]
    Client(String),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
