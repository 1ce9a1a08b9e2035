//! External collaborators consumed during record assembly
//!
//! Each trait is a narrow seam over one external service. Implementations
//! never fail the caller: lookups hand back whatever they found together with
//! a log text, and the assembler decides what to report.

use crate::error::{ResolveError, ResolveResult};
use async_trait::async_trait;
use mate_record::access::is_vacant;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Registry a record is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Crossref works
    Publication,
    /// DOI resolver (Zenodo and friends)
    Software,
    /// ROR organizations
    Organization,
    /// ORCID public API
    Author,
}

impl RecordKind {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publication => "publication",
            Self::Software => "software",
            Self::Organization => "organization",
            Self::Author => "author",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publication" => Ok(Self::Publication),
            "software" => Ok(Self::Software),
            "organization" => Ok(Self::Organization),
            "author" => Ok(Self::Author),
            other => Err(ResolveError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Registry response plus lookup log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    /// Registry JSON, `{}` when nothing was found
    pub metadata: Value,
    /// Lookup diagnostics, one line each
    pub log: String,
}

impl Fetched {
    /// Successful lookup
    #[must_use]
    pub fn found(metadata: Value) -> Self {
        Self {
            metadata,
            log: String::new(),
        }
    }

    /// Failed lookup
    #[must_use]
    pub fn empty(log: impl Into<String>) -> Self {
        Self {
            metadata: Value::Object(serde_json::Map::new()),
            log: log.into(),
        }
    }

    /// Check if nothing came back
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_vacant(&self.metadata)
    }
}

/// Organization search outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgMatch {
    /// ROR id of the first match
    pub ror_id: Option<String>,
    /// Search diagnostics
    pub log: String,
}

/// Fetch a record from a bibliographic or identity registry
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// Look up `id` in the registry for `kind`
    async fn get_record(&self, kind: RecordKind, id: &str) -> Fetched;
}

/// Find an organization's registry id from its website
#[async_trait]
pub trait OrganizationSearch: Send + Sync {
    /// Search by link; the first match wins
    async fn search_organization(&self, url: &str) -> OrgMatch;
}

/// Liveness check for user-supplied links
#[async_trait]
pub trait UriChecker: Send + Sync {
    /// `Ok` when the uri answers, else the error text
    async fn check_uri(&self, uri: &str) -> Result<(), String>;
}

/// Model repository name lookup
#[async_trait]
pub trait RepoExistence: Send + Sync {
    /// Whether a repository with this name already exists
    async fn exists(&self, name: &str) -> ResolveResult<bool>;
}

/// Every collaborator the assembler needs, borrowed
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Registry lookups
    pub records: &'a dyn RecordResolver,
    /// Organization search
    pub organizations: &'a dyn OrganizationSearch,
    /// Link checks
    pub uris: &'a dyn UriChecker,
    /// Repository name checks
    pub repos: &'a dyn RepoExistence,
}

impl<'a> Collaborators<'a> {
    /// Bundle one value implementing every collaborator trait
    pub fn from_one<T>(all: &'a T) -> Self
    where
        T: RecordResolver + OrganizationSearch + UriChecker + RepoExistence,
    {
        Self {
            records: all,
            organizations: all,
            uris: all,
            repos: all,
        }
    }
}

impl fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
