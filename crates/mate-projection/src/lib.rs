//! Website front matter projection for M@TE submissions
//!
//! The website describes each model with a flat YAML front matter block. This
//! crate derives it from the submission record:
//!
//! - [`expand`] broadcasts table rows over the record's lists
//! - [`project`] copies values, filling gaps with empty strings
//! - [`finish`] applies the presentation-schema fixes
//! - [`frontmatter`] renders the delimited YAML block
//!
//! [`ProjectionEngine`] ties them together.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod expand;
pub mod finish;
pub mod frontmatter;
pub mod project;

pub use engine::{ProjectionEngine, Rendered};
pub use error::{ProjectionError, ProjectionResult};
pub use expand::{expand_table, EntrySource, Expanded, ProjectionTable, TableEntry};
pub use finish::{ensure_prefix, extract_integers, Finisher, FinishingRules, PublicationRule};
pub use frontmatter::render_front_matter;
pub use project::{project, Projection};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for front matter projection
    pub use crate::engine::{ProjectionEngine, Rendered};
    pub use crate::error::{ProjectionError, ProjectionResult};
    pub use crate::expand::ProjectionTable;
    pub use crate::finish::FinishingRules;
}
