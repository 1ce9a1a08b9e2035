//! Collaborators for runs without network access
//!
//! Every lookup comes back empty with a log line saying so, and crate
//! templates are unavailable. The record still assembles from the issue text
//! alone, which is enough to preview the report and the website page.

use async_trait::async_trait;
use mate_graph::{GraphError, GraphResult, TemplateSource, TypeTemplates};
use mate_intake::{Fetched, OrgMatch, OrganizationSearch, RecordKind, RecordResolver, RepoExistence, ResolveResult, UriChecker};
use serde_json::Value;

const OFFLINE: &str = "offline";

/// Network-free stand-in for every collaborator
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl RecordResolver for Offline {
    async fn get_record(&self, kind: RecordKind, id: &str) -> Fetched {
        Fetched::empty(format!("{kind} lookup of {id} skipped: offline"))
    }
}

#[async_trait]
impl OrganizationSearch for Offline {
    async fn search_organization(&self, url: &str) -> OrgMatch {
        OrgMatch {
            ror_id: None,
            log: format!("organization search for {url} skipped: offline"),
        }
    }
}

#[async_trait]
impl UriChecker for Offline {
    async fn check_uri(&self, _uri: &str) -> Result<(), String> {
        Ok(())
    }
}

#[async_trait]
impl RepoExistence for Offline {
    async fn exists(&self, _name: &str) -> ResolveResult<bool> {
        Ok(false)
    }
}

#[async_trait]
impl TemplateSource for Offline {
    async fn crate_template(&self) -> GraphResult<Value> {
        Err(GraphError::template("crate template", OFFLINE))
    }

    async fn type_templates(&self) -> GraphResult<TypeTemplates> {
        Err(GraphError::template("type templates", OFFLINE))
    }

    async fn project_description(&self) -> GraphResult<String> {
        Err(GraphError::template("project description", OFFLINE))
    }
}
