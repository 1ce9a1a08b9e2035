//! Field-level errors
//!
//! Every field of a submission resolves to `Result<T, FieldError>`. The
//! assembler matches on the variant to decide between a fallback value and a
//! log entry; no variant ever aborts the whole parse.

use crate::log::Severity;

/// Why a single field could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// User left the field unanswered
    #[error("{0}")]
    Missing(String),

    /// Answer present but unparsable
    #[error("{0}")]
    Malformed(String),

    /// External registry lookup failed
    #[error("{0}")]
    ResolutionFailed(String),

    /// Input recognized but not handled
    #[error("{0}")]
    Unsupported(String),
}

impl FieldError {
    /// Create missing-answer error
    pub fn missing(message: impl Into<String>) -> Self {
        Self::Missing(message.into())
    }

    /// Create malformed-input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Create resolution-failure error
    pub fn resolution_failed(message: impl Into<String>) -> Self {
        Self::ResolutionFailed(message.into())
    }

    /// Create unsupported-input error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Severity this error is reported with
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Missing(_) | Self::Unsupported(_) => Severity::Warning,
            Self::Malformed(_) | Self::ResolutionFailed(_) => Severity::Error,
        }
    }

    /// Message without variant decoration
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Missing(m) | Self::Malformed(m) | Self::ResolutionFailed(m) | Self::Unsupported(m) => m,
        }
    }
}

/// Result type alias for field resolution
pub type FieldResult<T> = Result<T, FieldError>;
