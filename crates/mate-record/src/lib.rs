//! M@TE submission data model
//!
//! Shared vocabulary for the submission pipeline:
//!
//! - [`FieldPath`] and the [`access`] helpers address nested JSON values
//! - [`IdentityRecord`] models people and organizations with ORCID/ROR ids
//! - [`SubmissionRecord`] is the frozen output of issue parsing
//! - [`FieldMapping`] declares crosswalks from the record into other documents
//! - [`FieldError`] and [`ErrorLog`] carry per-field failures back to the user

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod access;
pub mod error;
pub mod identity;
pub mod log;
pub mod mapping;
pub mod path;
pub mod record;

pub use error::{FieldError, FieldResult};
pub use identity::{IdentityKind, IdentityRecord};
pub use log::{ErrorLog, LogEntry, Severity};
pub use mapping::{FieldMapping, SourceSpec};
pub use path::{FieldPath, PathError, Segment};
pub use record::{Metadata, RecordBuilder, SubmissionRecord};

/// Issue-form answer for an unanswered field
pub const NO_RESPONSE: &str = "_No response_";

/// Returned by DOI extraction when the input holds no DOI
pub const NO_DOI: &str = "No valid DOI found in the input string.";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with submission records
    pub use crate::access::{assign, is_vacant, lookup, lookup_present};
    pub use crate::error::{FieldError, FieldResult};
    pub use crate::identity::{IdentityKind, IdentityRecord};
    pub use crate::log::{ErrorLog, Severity};
    pub use crate::mapping::{FieldMapping, SourceSpec};
    pub use crate::path::{FieldPath, Segment};
    pub use crate::record::{Metadata, RecordBuilder, SubmissionRecord};
    pub use crate::{NO_DOI, NO_RESPONSE};
}
