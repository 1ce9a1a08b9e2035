//! Error types for registry and repository lookups

/// Errors talking to an external registry
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Transport failure, including timeouts
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status after retries
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not the JSON we expected
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Record kind without a configured registry
    #[error("Record type `{0}` not supported")]
    UnsupportedKind(String),

    /// HTTP client could not be built
    #[error("http client setup failed: {0}")]
    Client(String),
}

impl ResolveError {
    /// Create transport error for url
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Create status error for url
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create decode error for url
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for registry operations
pub type ResolveResult<T> = Result<T, ResolveError>;
