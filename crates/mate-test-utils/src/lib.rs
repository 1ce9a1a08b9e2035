//! Testing utilities for the M@TE workspace
//!
//! In-memory collaborators, an issue-body builder and registry fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use mate_core::{FileContents, MediaSource, RepositorySink, SinkError, SinkResult};
use mate_graph::{GraphError, GraphResult, TemplateSource, TypeTemplates};
use mate_intake::{
    Fetched, FormField, OrgMatch, OrganizationSearch, RecordKind, RecordResolver, RepoExistence, ResolveError,
    ResolveResult, UriChecker,
};
use mate_record::{SubmissionRecord, NO_RESPONSE};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Issue bodies
// ---------------------------------------------------------------------------

/// Issue body with every question present, unanswered unless set
#[derive(Debug, Clone, Default)]
pub struct IssueBody {
    answers: HashMap<FormField, String>,
}

impl IssueBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, field: FormField, text: &str) -> Self {
        self.answers.insert(field, text.to_string());
        self
    }

    /// Render with `\r\n` line endings, as GitHub stores issue forms
    pub fn build(&self) -> String {
        FormField::ALL
            .iter()
            .map(|field| {
                let answer = self.answers.get(field).map_or(NO_RESPONSE, String::as_str);
                format!("### {}\r\n\r\n{answer}\r\n\r\n", field.default_label())
            })
            .collect()
    }
}

pub fn record(value: Value) -> SubmissionRecord {
    SubmissionRecord::from_value(value)
}

// ---------------------------------------------------------------------------
// Registry fixtures
// ---------------------------------------------------------------------------

pub const ORCID_SMITH: &str = "0000-0001-2345-6789";
pub const ORCID_JONES: &str = "0000-0002-9876-5432";
pub const PUBLICATION_DOI: &str = "10.1029/2019GC008515";
pub const SOFTWARE_DOI: &str = "10.5281/zenodo.1436039";
pub const ANU_ROR: &str = "https://ror.org/019wvm592";
pub const ASSET_URL: &str = "https://github.com/user-attachments/assets/8d6f1a2c-landing";

pub fn orcid_record(orcid: &str, given: &str, family: &str, employer: &str) -> Value {
    json!({
        "orcid-identifier": {"uri": format!("https://orcid.org/{orcid}")},
        "person": {"name": {"given-names": {"value": given}, "family-name": {"value": family}}},
        "activities-summary": {"employments": {"affiliation-group": [
            {"summaries": [{"employment-summary": {"end-date": null, "organization": {"name": employer}}}]}
        ]}}
    })
}

pub fn ror_record(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name})
}

pub fn crossref_work() -> Value {
    json!({"message": {
        "URL": format!("http://dx.doi.org/{PUBLICATION_DOI}"),
        "title": ["Basalt flows on a cooling planet"],
        "issue": "4",
        "volume": "21",
        "ISSN": ["1525-2027"],
        "container-title": ["Geochemistry, Geophysics, Geosystems"],
        "publisher": "American Geophysical Union",
        "published": {"date-parts": [[2020, 4, 1]]},
        "author": [{"given": "Jane", "family": "Smith", "ORCID": format!("http://orcid.org/{ORCID_SMITH}"),
                    "affiliation": [{"name": "Australian National University"}]}],
        "abstract": "<jats:title>Abstract</jats:title><jats:p>Lava spreads and cools.</jats:p>",
        "funder": [{"name": "Australian Research Council"}]
    }})
}

pub fn zenodo_software() -> Value {
    json!({
        "title": "Underworld2",
        "metadata": {
            "version": "v2.15.1b",
            "creators": [{"name": "Moresi, Louis", "affiliation": "ANU"}]
        }
    })
}

/// Crate skeleton with the seed nodes the crosswalk maps into
pub fn crate_template() -> Value {
    json!({
        "@context": "https://w3id.org/ro/crate/1.1/context",
        "@graph": [
            {
                "@id": "ro-crate-metadata.json",
                "@type": "CreativeWork",
                "conformsTo": {"@id": "https://w3id.org/ro/crate/1.1"},
                "about": {"@id": "./"}
            },
            {
                "@id": "./",
                "@type": "Dataset",
                "name": "",
                "hasPart": [{"@id": "model_inputs"}, {"@id": "model_outputs"}, {"@id": "website_material"}],
                "mentions": {"@id": "#datasetCreation"}
            },
            {"@id": "model_inputs", "@type": "Dataset", "description": "Model code and inputs"},
            {"@id": "model_outputs", "@type": "Dataset", "description": "Model output data"},
            {"@id": "website_material", "@type": "Dataset", "description": "Website material"},
            {"@id": "#datasetCreation", "@type": "CreateAction", "result": {"@id": "model_outputs"}}
        ]
    })
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// In-memory registries, link checker and repository list
#[derive(Debug, Default)]
pub struct FakeRegistry {
    records: HashMap<(RecordKind, String), Value>,
    org_links: HashMap<String, String>,
    dead_uris: HashSet<String>,
    taken_repos: HashSet<String>,
    repo_lookup_fails: bool,
    lookups: Mutex<Vec<(RecordKind, String)>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry answering for the standard fixtures
    pub fn populated() -> Self {
        Self::new()
            .with_record(RecordKind::Author, ORCID_SMITH, orcid_record(ORCID_SMITH, "Jane", "Smith", "ANU"))
            .with_record(RecordKind::Author, ORCID_JONES, orcid_record(ORCID_JONES, "Ana", "Jones", "Monash"))
            .with_record(RecordKind::Publication, PUBLICATION_DOI, crossref_work())
            .with_record(RecordKind::Software, SOFTWARE_DOI, zenodo_software())
            .with_record(RecordKind::Organization, ANU_ROR, ror_record(ANU_ROR, "Australian National University"))
            .with_org_link("https://www.anu.edu.au", ANU_ROR)
    }

    pub fn with_record(mut self, kind: RecordKind, id: &str, metadata: Value) -> Self {
        self.records.insert((kind, id.to_string()), metadata);
        self
    }

    pub fn with_org_link(mut self, url: &str, ror_id: &str) -> Self {
        self.org_links.insert(url.to_string(), ror_id.to_string());
        self
    }

    pub fn with_dead_uri(mut self, uri: &str) -> Self {
        self.dead_uris.insert(uri.to_string());
        self
    }

    pub fn with_taken_repo(mut self, name: &str) -> Self {
        self.taken_repos.insert(name.to_string());
        self
    }

    pub fn with_failing_repo_lookup(mut self) -> Self {
        self.repo_lookup_fails = true;
        self
    }

    /// Every `get_record` call so far
    pub fn lookups(&self) -> Vec<(RecordKind, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordResolver for FakeRegistry {
    async fn get_record(&self, kind: RecordKind, id: &str) -> Fetched {
        self.lookups.lock().unwrap().push((kind, id.to_string()));
        match self.records.get(&(kind, id.to_string())) {
            Some(metadata) => Fetched::found(metadata.clone()),
            None => Fetched::empty(format!("no {kind} record for `{id}`\n")),
        }
    }
}

#[async_trait]
impl OrganizationSearch for FakeRegistry {
    async fn search_organization(&self, url: &str) -> OrgMatch {
        match self.org_links.get(url) {
            Some(ror_id) => OrgMatch {
                ror_id: Some(ror_id.clone()),
                log: String::new(),
            },
            None => OrgMatch {
                ror_id: None,
                log: format!("no organization linked to `{url}`\n"),
            },
        }
    }
}

#[async_trait]
impl UriChecker for FakeRegistry {
    async fn check_uri(&self, uri: &str) -> Result<(), String> {
        if self.dead_uris.contains(uri) {
            Err(format!("`{uri}` answered HTTP 404"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RepoExistence for FakeRegistry {
    async fn exists(&self, name: &str) -> ResolveResult<bool> {
        if self.repo_lookup_fails {
            return Err(ResolveError::status(format!("https://api.github.com/repos/x/{name}"), 500));
        }
        Ok(self.taken_repos.contains(name))
    }
}

/// Templates held in memory
#[derive(Debug, Clone)]
pub struct FakeTemplates {
    template: Option<Value>,
    types: Option<Value>,
    description: Option<String>,
}

impl Default for FakeTemplates {
    fn default() -> Self {
        Self {
            template: Some(crate_template()),
            types: None,
            description: Some("Models of the solid Earth, shared as research objects.".into()),
        }
    }
}

impl FakeTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every download fails
    pub fn unavailable() -> Self {
        Self {
            template: None,
            types: None,
            description: None,
        }
    }

    pub fn with_types(mut self, types: Value) -> Self {
        self.types = Some(types);
        self
    }
}

#[async_trait]
impl TemplateSource for FakeTemplates {
    async fn crate_template(&self) -> GraphResult<Value> {
        self.template
            .clone()
            .ok_or_else(|| GraphError::template("memory://crate-template", "HTTP 404"))
    }

    async fn type_templates(&self) -> GraphResult<TypeTemplates> {
        self.types
            .as_ref()
            .map(TypeTemplates::from_value)
            .ok_or_else(|| GraphError::template("memory://type-templates", "HTTP 404"))
    }

    async fn project_description(&self) -> GraphResult<String> {
        self.description
            .clone()
            .ok_or_else(|| GraphError::template("memory://readme", "HTTP 404"))
    }
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// One recorded file write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    pub message: String,
    pub content: Vec<u8>,
    pub sha: Option<String>,
}

impl FileWrite {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

#[derive(Debug, Default)]
struct SinkState {
    existing: HashMap<String, Vec<u8>>,
    writes: Vec<FileWrite>,
    comments: Vec<String>,
    topics: Option<Vec<String>>,
}

/// Repository and issue held in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<SinkState>,
    failing_path: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository already holding `path`
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .existing
            .insert(path.to_string(), content.as_bytes().to_vec());
        self
    }

    /// Writes to `path` fail with a server error
    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing_path = Some(path.to_string());
        self
    }

    pub fn writes(&self) -> Vec<FileWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn written_paths(&self) -> Vec<String> {
        self.writes().into_iter().map(|w| w.path).collect()
    }

    pub fn file(&self, path: &str) -> Option<FileWrite> {
        self.writes().into_iter().rev().find(|w| w.path == path)
    }

    pub fn comments(&self) -> Vec<String> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn topics(&self) -> Option<Vec<String>> {
        self.state.lock().unwrap().topics.clone()
    }

    fn write(&self, path: &str, message: &str, content: &[u8], sha: Option<&str>) -> SinkResult<()> {
        if self.failing_path.as_deref() == Some(path) {
            return Err(SinkError::status(format!("memory://{path}"), 500, "write refused"));
        }
        let mut state = self.state.lock().unwrap();
        state.existing.insert(path.to_string(), content.to_vec());
        state.writes.push(FileWrite {
            path: path.to_string(),
            message: message.to_string(),
            content: content.to_vec(),
            sha: sha.map(str::to_string),
        });
        Ok(())
    }
}

#[async_trait]
impl RepositorySink for MemorySink {
    async fn create_file(&self, path: &str, message: &str, content: &[u8]) -> SinkResult<()> {
        self.write(path, message, content, None)
    }

    async fn update_file(&self, path: &str, message: &str, content: &[u8], sha: &str) -> SinkResult<()> {
        self.write(path, message, content, Some(sha))
    }

    async fn get_contents(&self, path: &str) -> SinkResult<FileContents> {
        let state = self.state.lock().unwrap();
        let content = state
            .existing
            .get(path)
            .ok_or_else(|| SinkError::NotFound(format!("memory://{path}")))?;
        Ok(FileContents {
            path: path.to_string(),
            sha: format!("sha-{}", content.len()),
            content: content.clone(),
        })
    }

    async fn create_comment(&self, body: &str) -> SinkResult<()> {
        self.state.lock().unwrap().comments.push(body.to_string());
        Ok(())
    }

    async fn replace_topics(&self, topics: &[String]) -> SinkResult<()> {
        self.state.lock().unwrap().topics = Some(topics.to_vec());
        Ok(())
    }
}

/// Downloads served from memory
#[derive(Debug, Default)]
pub struct FakeMedia {
    files: HashMap<String, Vec<u8>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, url: &str, content: &[u8]) -> Self {
        self.files.insert(url.to_string(), content.to_vec());
        self
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    async fn fetch(&self, url: &str) -> SinkResult<Vec<u8>> {
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| SinkError::status(url, 404, "Not Found"))
    }
}
