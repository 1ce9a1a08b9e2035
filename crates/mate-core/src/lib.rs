//! Pipeline orchestration for M@TE model submissions
//!
//! Wires intake, crate building and page projection together and publishes
//! the results:
//!
//! - [`config`] loads the versioned crosswalk and runtime settings
//! - [`pipeline`] runs parse, crate and page for one issue
//! - [`report`] renders issue comments and the README
//! - [`sink`] writes to the model repository and the submission issue
//! - [`media`] copies uploaded images into the repository
//! - [`topics`] derives repository topics
//! - [`offline`] stands in for the network when previewing

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod media;
pub mod offline;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod topics;

pub use config::{Constants, Crosswalk, GitHubConfig, PipelineConfig, SUPPORTED_CROSSWALK_VERSION};
pub use error::{ConfigError, ConfigResult, PipelineError, PipelineResult, SinkError, SinkResult};
pub use media::{copy_media, media_files, HttpMedia, MediaFile, MediaSource};
pub use offline::Offline;
pub use pipeline::{timestamp, Outputs, Pipeline, PublishSummary};
pub use sink::{FileContents, GitHubSink, RepositorySink};
pub use topics::{repository_topics, sanitize_topic};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the pipeline
    pub use crate::config::{Crosswalk, PipelineConfig};
    pub use crate::error::{PipelineError, PipelineResult, SinkError, SinkResult};
    pub use crate::media::MediaSource;
    pub use crate::pipeline::{Outputs, Pipeline, PublishSummary};
    pub use crate::sink::{FileContents, RepositorySink};
}
