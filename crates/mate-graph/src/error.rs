//! Error types for crate graph construction
//!
//! Template download failures are fatal for the crate artifact. Everything
//! else is structural: the graph is not shaped the way an RO-Crate must be.

/// Errors building or transforming a crate graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Document has no `@graph` array
    #[error("crate document has no `@graph` array")]
    MissingGraph,

    /// A `@graph` entry is not an object
    #[error("`@graph` entry {0} is not an object")]
    NotAnObject(usize),

    /// No node carries the id
    #[error("no node with `@id` `{0}`")]
    NodeNotFound(String),

    /// Template could not be downloaded or parsed
    #[error("unable to load template from {url}: {message}")]
    Template {
        /// Template location
        url: String,
        /// Underlying failure
        message: String,
    },

    /// Canonicalization transform failed
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// Mapping table references a malformed path
    #[error(transparent)]
    Path(#[from] mate_record::PathError),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Create template error for url
    pub fn template(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether crate generation must stop
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Template { .. })
    }
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(GraphError::MissingGraph.to_string(), "crate document has no `@graph` array");
        assert_eq!(
            GraphError::NodeNotFound("./".into()).to_string(),
            "no node with `@id` `./`"
        );
        assert_eq!(
            GraphError::template("https://example.org/t.json", "HTTP 404").to_string(),
            "unable to load template from https://example.org/t.json: HTTP 404"
        );
    }

    #[test]
    fn only_template_errors_are_fatal() {
        assert!(GraphError::template("u", "m").is_fatal());
        assert!(!GraphError::MissingGraph.is_fatal());
        assert!(!GraphError::NotAnObject(3).is_fatal());
    }
}
