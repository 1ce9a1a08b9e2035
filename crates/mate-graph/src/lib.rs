//! RO-Crate graph building for M@TE model repositories
//!
//! Populates the M@TE crate template from a submission record:
//!
//! - [`blank`] assigns `#bN` ids to anonymous objects
//! - [`mapping`] copies record values into template nodes
//! - [`flatten`] promotes nested objects to top-level nodes
//! - [`defaults`] stamps the collection, publisher and date on the root
//! - [`canonical`] optionally swaps in a JSON-LD canonicalized form
//!
//! [`GraphBuilder`] runs them in order.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod blank;
pub mod builder;
pub mod canonical;
pub mod defaults;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod links;
pub mod mapping;
pub mod templates;

pub use blank::{assign_blank_ids, BlankIds};
pub use builder::GraphBuilder;
pub use canonical::{canonicalize_or_keep, Canonicalizer};
pub use defaults::{extract_project_description, RootDefaults, MATE_DOI};
pub use error::{GraphError, GraphResult};
pub use flatten::flatten;
pub use graph::{CrateGraph, Node, ROOT_ID};
pub use links::{check_links, LinkReport};
pub use mapping::{apply_mappings, EntityMapping};
pub use templates::{HttpTemplates, TemplateSource, TemplateUrls, TypeTemplates};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for crate building
    pub use crate::builder::GraphBuilder;
    pub use crate::defaults::RootDefaults;
    pub use crate::error::{GraphError, GraphResult};
    pub use crate::graph::CrateGraph;
    pub use crate::mapping::EntityMapping;
    pub use crate::templates::{TemplateSource, TypeTemplates};
}
