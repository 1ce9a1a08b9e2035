//! Uploaded media copy
//!
//! Images and animations attached to the submission issue are downloaded and
//! committed under the website graphics directory.

use crate::error::{SinkError, SinkResult};
use crate::sink::RepositorySink;
use async_trait::async_trait;
use mate_intake::file_name;
use mate_record::SubmissionRecord;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Record fields holding uploaded media
pub const MEDIA_FIELDS: [&str; 4] = ["landing_image", "animation", "graphic_abstract", "model_setup_figure"];

/// Website graphics directory
pub const GRAPHICS_DIR: &str = "website_material/graphics/";

/// Download of uploaded assets
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch the bytes behind `url`
    async fn fetch(&self, url: &str) -> SinkResult<Vec<u8>>;
}

/// Media downloads over HTTP
#[derive(Debug, Clone)]
pub struct HttpMedia {
    client: Client,
}

impl HttpMedia {
    /// Create media source
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> SinkResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SinkError::http("media client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaSource for HttpMedia {
    async fn fetch(&self, url: &str) -> SinkResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SinkError::http(url, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::status(url, status.as_u16(), status.to_string()));
        }
        let bytes = response.bytes().await.map_err(|e| SinkError::http(url, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// One media file to copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Record field it came from
    pub field: &'static str,
    /// Target file name
    pub filename: String,
    /// Upload url
    pub url: String,
}

/// Media entries with an upload url
#[must_use]
pub fn media_files(record: &SubmissionRecord) -> Vec<MediaFile> {
    MEDIA_FIELDS
        .into_iter()
        .filter_map(|field| {
            let entry = record.get(field)?;
            let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::trim).unwrap_or_default();
            let (filename, url) = (file_name(text("filename")), text("url"));
            if url.is_empty() || filename.is_empty() {
                info!(field, "no upload to copy");
                return None;
            }
            Some(MediaFile {
                field,
                filename: filename.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Copy every uploaded file into the graphics directory
///
/// A download failure skips that file; a write failure stops the copy.
/// Returns the repository paths written.
///
/// # Errors
/// The first failing repository write.
pub async fn copy_media(
    record: &SubmissionRecord,
    source: &dyn MediaSource,
    sink: &dyn RepositorySink,
) -> SinkResult<Vec<String>> {
    let mut written = Vec::new();
    for file in media_files(record) {
        let bytes = match source.fetch(&file.url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(field = file.field, error = %err, "media download failed, skipping");
                continue;
            }
        };
        let path = format!("{GRAPHICS_DIR}{}", file.filename);
        sink.create_file(&path, &format!("add {}", file.filename), &bytes).await?;
        written.push(path);
    }
    Ok(written)
}
