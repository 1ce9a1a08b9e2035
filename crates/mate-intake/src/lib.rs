//! Submission intake for the Model Atlas of the Earth
//!
//! Turns a GitHub issue-form body into a [`SubmissionRecord`]:
//!
//! 1. [`FieldExtractor`] splits the body into question → answer pairs
//! 2. The text helpers and [`EntityResolver`] interpret each answer, looking
//!    identifiers up through the collaborator traits in [`resolve`]
//! 3. [`RecordAssembler`] puts the record together in dependency order and
//!    collects every problem into an [`ErrorLog`]
//!
//! [`HttpRegistry`] implements the collaborators against Crossref, DOI
//! resolvers, ROR, ORCID and the GitHub API.
//!
//! [`SubmissionRecord`]: mate_record::SubmissionRecord
//! [`ErrorLog`]: mate_record::ErrorLog

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assemble;
pub mod entity;
pub mod error;
pub mod extract;
pub mod form;
pub mod funding;
pub mod http;
pub mod images;
pub mod license;
pub mod metadata;
pub mod resolve;
pub mod slug;
pub mod text;

pub use assemble::{Assembled, IntakeConfig, RecordAssembler};
pub use entity::{deduplicate, reconcile_roles, EntityResolver, Resolved};
pub use error::{ResolveError, ResolveResult};
pub use extract::{Answer, FieldExtractor, IssueFields};
pub use form::{FormField, FormLabels};
pub use funding::{parse_funding, Funding, Grant};
pub use http::{HttpRegistry, RegistryConfig};
pub use images::{file_name, parse_image_and_caption, ImageRecord};
pub use license::{LicenseRecord, LicenseTable};
pub use resolve::{
    Collaborators, Fetched, OrgMatch, OrganizationSearch, RecordKind, RecordResolver, RepoExistence, UriChecker,
};
pub use slug::{choose_repository_slug, validate_slug, SlugChoice};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for intake
    pub use crate::assemble::{Assembled, IntakeConfig, RecordAssembler};
    pub use crate::entity::EntityResolver;
    pub use crate::error::{ResolveError, ResolveResult};
    pub use crate::extract::{extract, FieldExtractor, IssueFields};
    pub use crate::form::{FormField, FormLabels};
    pub use crate::http::{HttpRegistry, RegistryConfig};
    pub use crate::resolve::{
        Collaborators, Fetched, OrgMatch, OrganizationSearch, RecordKind, RecordResolver, RepoExistence, UriChecker,
    };
}
