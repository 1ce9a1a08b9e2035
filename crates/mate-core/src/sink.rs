//! Repository sink
//!
//! Everything the pipeline publishes goes through [`RepositorySink`]: files
//! into the model repository, comments onto the submission issue, and the
//! repository topics. [`GitHubSink`] talks to the GitHub REST API.

use crate::config::GitHubConfig;
use crate::error::{SinkError, SinkResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Existing file in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// Repository path
    pub path: String,
    /// Blob sha, required to update the file
    pub sha: String,
    /// Decoded content
    pub content: Vec<u8>,
}

/// Destination for published material
#[async_trait]
pub trait RepositorySink: Send + Sync {
    /// Create a new file
    async fn create_file(&self, path: &str, message: &str, content: &[u8]) -> SinkResult<()>;

    /// Replace an existing file identified by its blob sha
    async fn update_file(&self, path: &str, message: &str, content: &[u8], sha: &str) -> SinkResult<()>;

    /// Read a file
    ///
    /// Returns [`SinkError::NotFound`] when the path does not exist.
    async fn get_contents(&self, path: &str) -> SinkResult<FileContents>;

    /// Comment on the submission issue
    async fn create_comment(&self, body: &str) -> SinkResult<()>;

    /// Replace the repository topics
    async fn replace_topics(&self, topics: &[String]) -> SinkResult<()>;
}

#[derive(Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
}

/// GitHub REST API sink
#[derive(Debug, Clone)]
pub struct GitHubSink {
    client: Client,
    config: GitHubConfig,
}

impl GitHubSink {
    /// Create sink
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: GitHubConfig, timeout_secs: u64) -> SinkResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("mate-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::http(&config.api_base, e.to_string()))?;
        Ok(Self { client, config })
    }

    fn repo_url(&self, tail: &str) -> SinkResult<String> {
        let repo = self.config.repo.as_deref().ok_or(SinkError::Unconfigured("model repository"))?;
        Ok(format!("{}/repos/{}/{repo}/{tail}", self.config.api_base, self.config.owner))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/vnd.github+json");
        match &self.config.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> SinkResult<Value> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SinkError::http(url, e.to_string()))?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status == StatusCode::NOT_FOUND {
            return Err(SinkError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
            return Err(SinkError::status(url, status.as_u16(), message));
        }
        Ok(body)
    }

    async fn put_file(&self, path: &str, message: &str, content: &[u8], sha: Option<&str>) -> SinkResult<()> {
        let url = self.repo_url(&format!("contents/{path}"))?;
        let mut body = json!({
            "message": message,
            "content": general_purpose::STANDARD.encode(content),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }
        self.send(&url, self.client.put(&url).json(&body)).await?;
        info!(path, bytes = content.len(), "file written");
        Ok(())
    }
}

#[async_trait]
impl RepositorySink for GitHubSink {
    async fn create_file(&self, path: &str, message: &str, content: &[u8]) -> SinkResult<()> {
        self.put_file(path, message, content, None).await
    }

    async fn update_file(&self, path: &str, message: &str, content: &[u8], sha: &str) -> SinkResult<()> {
        self.put_file(path, message, content, Some(sha)).await
    }

    async fn get_contents(&self, path: &str) -> SinkResult<FileContents> {
        let url = self.repo_url(&format!("contents/{path}"))?;
        let body = self.send(&url, self.client.get(&url)).await?;
        let contents: ContentsResponse =
            serde_json::from_value(body).map_err(|e| SinkError::decode(&url, e.to_string()))?;
        debug!(path = %contents.path, sha = %contents.sha, "file read");
        Ok(FileContents {
            content: decode_content(&contents.content).map_err(|e| SinkError::decode(&url, e))?,
            path: contents.path,
            sha: contents.sha,
        })
    }

    async fn create_comment(&self, body: &str) -> SinkResult<()> {
        let number = self.config.issue_number.ok_or(SinkError::Unconfigured("issue number"))?;
        let url = format!(
            "{}/repos/{}/issues/{number}/comments",
            self.config.api_base, self.config.submission_repo
        );
        self.send(&url, self.client.post(&url).json(&json!({ "body": body }))).await?;
        info!(issue = number, "comment posted");
        Ok(())
    }

    async fn replace_topics(&self, topics: &[String]) -> SinkResult<()> {
        let url = self.repo_url("topics")?;
        self.send(&url, self.client.put(&url).json(&json!({ "names": topics }))).await?;
        info!(count = topics.len(), "topics replaced");
        Ok(())
    }
}

/// Decode the API's line-wrapped base64
fn decode_content(encoded: &str) -> Result<Vec<u8>, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    general_purpose::STANDARD.decode(compact).map_err(|e| e.to_string())
}
