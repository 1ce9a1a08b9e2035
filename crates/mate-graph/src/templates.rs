//! Crate templates
//!
//! The crate skeleton, the per-type attribute templates and the project
//! description all live in the metadata schema repository. [`TemplateSource`]
//! abstracts where they come from; [`HttpTemplates`] downloads them.

use crate::defaults::extract_project_description;
use crate::error::{GraphError, GraphResult};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Allowed attributes per `@type`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTemplates {
    allowed: IndexMap<String, Vec<String>>,
}

impl TypeTemplates {
    /// Read templates keyed by type name
    ///
    /// A template may be an example object (its keys are allowed) or a list
    /// of attribute names.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let allowed = value
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(kind, template)| {
                let keys: Vec<String> = match template {
                    Value::Object(map) => map.keys().cloned().collect(),
                    Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
                    _ => return None,
                };
                Some((kind.clone(), keys))
            })
            .collect();
        Self { allowed }
    }

    /// Number of templated types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Check if no type is templated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Drop attributes not allowed for each object's `@type`
    ///
    /// Objects of untemplated types are left alone, but their children are
    /// still filtered. `@id` and `@type` are always kept.
    #[must_use]
    pub fn filter(&self, mut value: Value) -> Value {
        self.filter_in_place(&mut value);
        value
    }

    fn filter_in_place(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                let allowed = map
                    .get("@type")
                    .and_then(Value::as_str)
                    .and_then(|kind| self.allowed.get(kind));
                if let Some(allowed) = allowed {
                    map.retain(|key, _| key == "@id" || key == "@type" || allowed.iter().any(|a| a == key));
                }
                map.values_mut().for_each(|v| self.filter_in_place(v));
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.filter_in_place(v)),
            _ => {}
        }
    }
}

/// Source of crate templates
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Crate skeleton with the seed nodes
    async fn crate_template(&self) -> GraphResult<Value>;

    /// Attribute templates per type
    async fn type_templates(&self) -> GraphResult<TypeTemplates>;

    /// Collection description for the root entity
    async fn project_description(&self) -> GraphResult<String>;
}

/// Where the templates are downloaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateUrls {
    /// RO-Crate skeleton
    pub crate_template: String,
    /// Per-type attribute templates
    pub type_templates: String,
    /// README holding the project description
    pub readme: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for TemplateUrls {
    fn default() -> Self {
        let schema = "https://raw.githubusercontent.com/ModelAtlasofTheEarth/metadata_schema/main";
        Self {
            crate_template: format!("{schema}/mate_ro_crate/ro-crate-metadata.json"),
            type_templates: format!("{schema}/mate_ro_crate/type_templates.json"),
            readme: format!("{schema}/README.md"),
            timeout_secs: 10,
        }
    }
}

/// Templates fetched over HTTP
#[derive(Debug, Clone)]
pub struct HttpTemplates {
    client: reqwest::Client,
    urls: TemplateUrls,
}

impl HttpTemplates {
    /// Create template source
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn new(urls: TemplateUrls) -> GraphResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(urls.timeout_secs))
            .build()
            .map_err(|e| GraphError::template(&urls.crate_template, e.to_string()))?;
        Ok(Self { client, urls })
    }

    async fn get_text(&self, url: &str) -> GraphResult<String> {
        debug!(url, "downloading template");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GraphError::template(url, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GraphError::template(url, format!("HTTP {}", status.as_u16())));
        }
        response.text().await.map_err(|e| GraphError::template(url, e.to_string()))
    }

    async fn get_json(&self, url: &str) -> GraphResult<Value> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|e| GraphError::template(url, e.to_string()))
    }
}

#[async_trait]
impl TemplateSource for HttpTemplates {
    async fn crate_template(&self) -> GraphResult<Value> {
        self.get_json(&self.urls.crate_template).await
    }

    async fn type_templates(&self) -> GraphResult<TypeTemplates> {
        let value = self.get_json(&self.urls.type_templates).await?;
        Ok(TypeTemplates::from_value(&value))
    }

    async fn project_description(&self) -> GraphResult<String> {
        let readme = self.get_text(&self.urls.readme).await?;
        extract_project_description(&readme).ok_or_else(|| {
            GraphError::template(
                &self.urls.readme,
                "The 'Project Description' section was not found in the README.md file.",
            )
        })
    }
}
