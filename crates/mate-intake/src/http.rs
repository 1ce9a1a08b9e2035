//! `reqwest` implementations of the registry collaborators
//!
//! Record lookups retry on server-side failures (429, 500, 502, 503, 504) and
//! timeouts with exponential backoff. Liveness checks, organization search
//! and repository existence checks are single attempts.

use crate::error::{ResolveError, ResolveResult};
use crate::resolve::{Fetched, OrgMatch, OrganizationSearch, RecordKind, RecordResolver, RepoExistence, UriChecker};
use async_trait::async_trait;
use mate_record::access::is_vacant;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, warn};

const CONTENT_TYPES: [&str; 2] = ["application/ld+json", "application/json"];

const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Registry endpoints and request policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Crossref works endpoint
    pub publication_base: String,
    /// DOI resolver used for software records
    pub software_base: String,
    /// ROR organization endpoint
    pub organization_base: String,
    /// ORCID public API
    pub author_base: String,
    /// ROR search endpoint
    pub organization_search: String,
    /// GitHub REST API root
    pub github_api: String,
    /// Organization owning the model repositories
    pub owner: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay in milliseconds, doubled per retry
    pub backoff_base_ms: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Token for GitHub API calls
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

impl RegistryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base url for a record kind
    #[must_use]
    pub fn with_base_url(mut self, kind: RecordKind, url: impl Into<String>) -> Self {
        let url = url.into();
        match kind {
            RecordKind::Publication => self.publication_base = url,
            RecordKind::Software => self.software_base = url,
            RecordKind::Organization => self.organization_base = url,
            RecordKind::Author => self.author_base = url,
        }
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// With retry budget
    #[inline]
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// With GitHub token
    #[inline]
    #[must_use]
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    /// With owning organization
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Base url for a record kind
    #[must_use]
    pub fn base_url(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Publication => &self.publication_base,
            RecordKind::Software => &self.software_base,
            RecordKind::Organization => &self.organization_base,
            RecordKind::Author => &self.author_base,
        }
    }

    /// Backoff before retry number `attempt` (0-based)
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1 << attempt.min(16)))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            publication_base: "https://api.crossref.org/works/".into(),
            software_base: "https://doi.org/".into(),
            organization_base: "https://api.ror.org/organizations/".into(),
            author_base: "https://pub.orcid.org/v3.0/".into(),
            organization_search: "https://api.ror.org/organizations".into(),
            github_api: "https://api.github.com".into(),
            owner: "ModelAtlasofTheEarth".into(),
            timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 500,
            user_agent: concat!("mate-intake/", env!("CARGO_PKG_VERSION")).into(),
            github_token: None,
        }
    }
}

/// HTTP-backed registry client
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    /// Redirects off: a moved repository reports 301
    github: Client,
    config: RegistryConfig,
}

impl HttpRegistry {
    /// Build clients from configuration
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialised.
    pub fn new(config: RegistryConfig) -> ResolveResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ResolveError::Client(e.to_string()))?;
        let github = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ResolveError::Client(e.to_string()))?;

        Ok(Self { client, github, config })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// GET with the retry policy
    async fn get_with_retry(&self, url: &str, content_type: &str) -> ResolveResult<Response> {
        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .get(url)
                .header(CONTENT_TYPE, content_type)
                .header(ACCEPT, content_type)
                .send()
                .await;

            let retryable = match &sent {
                Ok(response) => RETRY_STATUSES.contains(&response.status()),
                Err(err) => err.is_timeout(),
            };
            if retryable && attempt < self.config.max_retries {
                let delay = self.config.backoff(attempt);
                debug!(url, attempt, ?delay, "retrying registry request");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let response = sent.map_err(|e| ResolveError::http(url, e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ResolveError::status(url, status.as_u16()));
            }
            return Ok(response);
        }
    }

    async fn fetch_json(&self, url: &str, content_type: &str) -> ResolveResult<Value> {
        let response = self.get_with_retry(url, content_type).await?;
        let body = response.text().await.map_err(|e| ResolveError::http(url, e))?;
        serde_json::from_str(&body).map_err(|e| ResolveError::decode(url, e.to_string()))
    }
}

#[async_trait]
impl RecordResolver for HttpRegistry {
    async fn get_record(&self, kind: RecordKind, id: &str) -> Fetched {
        let url = format!("{}{}", self.config.base_url(kind), id);
        debug!(%kind, url, "fetching registry record");

        let mut log = String::new();
        for content_type in CONTENT_TYPES {
            match self.fetch_json(&url, content_type).await {
                Ok(metadata) if !is_vacant(&metadata) => {
                    return Fetched { metadata, log };
                }
                Ok(_) => {
                    let _ = writeln!(log, "Empty response with {content_type} from {url}");
                }
                Err(err) => {
                    warn!(%kind, url, error = %err, "registry lookup failed");
                    let _ = writeln!(log, "Error fetching metadata with {content_type} from {url}: {err}");
                }
            }
        }

        log.push_str("Failed to fetch metadata with any content type or URL.\n");
        Fetched::empty(log)
    }
}

#[derive(Debug, Deserialize)]
struct RorSearch {
    #[serde(default)]
    number_of_results: usize,
    #[serde(default)]
    items: Vec<RorItem>,
}

#[derive(Debug, Deserialize)]
struct RorItem {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    relationships: Vec<RorRelation>,
}

#[derive(Debug, Deserialize)]
struct RorRelation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    id: String,
}

/// Strip the scheme and a trailing slash from an organization link
fn link_query(url: &str) -> &str {
    let bare = url.rsplit("://").next().unwrap_or(url);
    bare.strip_suffix('/').unwrap_or(bare)
}

/// Summarise a ROR search response
fn describe_search(link: &str, search: &RorSearch) -> OrgMatch {
    let mut log = String::new();
    let first = search.items.first();

    match (search.number_of_results, first) {
        (0, _) | (_, None) => {
            let _ = writeln!(log, "Unable to find ROR for {link} ");
            OrgMatch { ror_id: None, log }
        }
        (1, Some(item)) => {
            let _ = writeln!(log, "Found ROR record for {link}: {} ({}) ", item.name, item.id);
            for parent in item.relationships.iter().filter(|r| r.kind == "Parent") {
                let _ = writeln!(
                    log,
                    "Note: This organization has a parent organization: {} ({}) ",
                    parent.label, parent.id
                );
            }
            OrgMatch {
                ror_id: Some(item.id.clone()),
                log,
            }
        }
        (_, Some(item)) => {
            let _ = writeln!(
                log,
                "Found more than one ROR record for {link}. Assuming the first result is correct; if not please enter the correct ROR. "
            );
            for candidate in &search.items {
                let _ = writeln!(log, "\t - {} ({}) ", candidate.name, candidate.id);
            }
            OrgMatch {
                ror_id: Some(item.id.clone()),
                log,
            }
        }
    }
}

#[async_trait]
impl OrganizationSearch for HttpRegistry {
    async fn search_organization(&self, url: &str) -> OrgMatch {
        let link = link_query(url);
        let query = format!("{}?query.advanced=links:{link}", self.config.organization_search);

        let search = match self.fetch_json(&query, "application/json").await {
            Ok(value) => serde_json::from_value::<RorSearch>(value)
                .map_err(|e| ResolveError::decode(&query, e.to_string())),
            Err(err) => Err(err),
        };

        match search {
            Ok(search) => describe_search(link, &search),
            Err(err) => {
                warn!(link, error = %err, "organization search failed");
                OrgMatch {
                    ror_id: None,
                    log: format!("Error fetching metadata: {err} \n"),
                }
            }
        }
    }
}

#[async_trait]
impl UriChecker for HttpRegistry {
    async fn check_uri(&self, uri: &str) -> Result<(), String> {
        let response = self.client.get(uri).send().await.map_err(|e| e.to_string())?;
        response.error_for_status().map(|_| ()).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl RepoExistence for HttpRegistry {
    async fn exists(&self, name: &str) -> ResolveResult<bool> {
        let url = format!("{}/repos/{}/{name}", self.config.github_api, self.config.owner);
        let mut request = self.github.get(&url).header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.config.github_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| ResolveError::http(&url, e))?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::MOVED_PERMANENTLY => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ResolveError::status(url, status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_bases_match_registries() {
        let config = RegistryConfig::default();
        assert_eq!(config.base_url(RecordKind::Author), "https://pub.orcid.org/v3.0/");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn backoff_doubles() {
        let config = RegistryConfig::default();
        assert_eq!(config.backoff(0), Duration::from_millis(500));
        assert_eq!(config.backoff(1), Duration::from_millis(1000));
        assert_eq!(config.backoff(2), Duration::from_millis(2000));
    }

    #[test]
    fn base_url_override() {
        let config = RegistryConfig::new().with_base_url(RecordKind::Software, "http://localhost/");
        assert_eq!(config.base_url(RecordKind::Software), "http://localhost/");
    }

    #[test]
    fn link_query_strips_scheme_and_slash() {
        assert_eq!(link_query("https://www.anu.edu.au/"), "www.anu.edu.au");
        assert_eq!(link_query("anu.edu.au"), "anu.edu.au");
    }

    #[test]
    fn search_with_several_matches_lists_alternatives() {
        let search: RorSearch = serde_json::from_value(json!({
            "number_of_results": 2,
            "items": [
                {"id": "https://ror.org/019wvm592", "name": "Australian National University"},
                {"id": "https://ror.org/000000000", "name": "ANU Press"}
            ]
        }))
        .unwrap();

        let found = describe_search("anu.edu.au", &search);
        assert_eq!(found.ror_id.as_deref(), Some("https://ror.org/019wvm592"));
        assert!(found.log.contains("more than one ROR record"));
        assert!(found.log.contains("ANU Press"));
    }

    #[test]
    fn search_without_matches_logs_not_found() {
        let search: RorSearch = serde_json::from_value(json!({"number_of_results": 0, "items": []})).unwrap();
        let found = describe_search("nowhere.example", &search);
        assert_eq!(found.ror_id, None);
        assert!(found.log.contains("Unable to find ROR for nowhere.example"));
    }

    #[test]
    fn single_match_notes_parent() {
        let search: RorSearch = serde_json::from_value(json!({
            "number_of_results": 1,
            "items": [{
                "id": "https://ror.org/04yx6dh41",
                "name": "National Computational Infrastructure",
                "relationships": [{"type": "Parent", "label": "ANU", "id": "https://ror.org/019wvm592"}]
            }]
        }))
        .unwrap();

        let found = describe_search("nci.org.au", &search);
        assert!(found.log.contains("parent organization: ANU"));
    }
}
