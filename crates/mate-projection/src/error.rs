//! Error types for the projection engine

/// Errors projecting a record into front matter
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// Projection table or finishing rule holds a malformed path
    #[error("invalid path `{path}`: {source}")]
    Path {
        path: String,
        #[source]
        source: mate_record::PathError,
    },

    /// Front matter could not be serialized
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProjectionError {
    /// Create path error
    pub fn path(path: impl Into<String>, source: mate_record::PathError) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for projection operations
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Parse a configured path
pub(crate) fn parse_path(raw: &str) -> ProjectionResult<mate_record::FieldPath> {
    raw.parse().map_err(|e| ProjectionError::path(raw, e))
}
