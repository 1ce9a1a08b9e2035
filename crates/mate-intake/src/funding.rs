//! Funding answers
//!
//! One funder per line, optionally followed by a grant number:
//! `https://ror.org/05mmh0f86, DP200100000`.

use crate::entity::{EntityResolver, Resolved};
use mate_record::IdentityRecord;
use serde::{Deserialize, Serialize};

/// A grant awarded by one funder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Always `Grant`
    #[serde(rename = "@type")]
    pub kind: String,
    /// Grant number as written
    pub identifier: String,
    /// Funding organization
    pub funder: IdentityRecord,
}

impl Grant {
    /// Create grant
    #[must_use]
    pub fn new(identifier: impl Into<String>, funder: IdentityRecord) -> Self {
        Self {
            kind: "Grant".to_string(),
            identifier: identifier.into(),
            funder,
        }
    }
}

/// Funders and grants parsed from the funder answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Funding {
    /// Each funding organization once
    pub funders: Vec<IdentityRecord>,
    /// Grants in answer order
    pub grants: Vec<Grant>,
}

impl Funding {
    /// Whether nothing was listed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.funders.is_empty() && self.grants.is_empty()
    }
}

fn split_line(line: &str) -> (&str, Option<&str>) {
    match line.split_once(',') {
        Some((funder, grant)) => {
            let grant = grant.trim();
            (funder.trim(), (!grant.is_empty()).then_some(grant))
        }
        None => (line.trim(), None),
    }
}

/// Parse a funder answer block
pub async fn parse_funding(resolver: &EntityResolver<'_>, block: &str) -> Resolved<Funding> {
    let mut funding = Funding::default();
    let mut log = String::new();

    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (name_or_url, grant) = split_line(line);
        if name_or_url.is_empty() {
            continue;
        }

        let resolved = resolver.resolve_organization(name_or_url).await;
        log.push_str(&resolved.log);
        let mut funder = resolved.value;
        if funder.id.is_none() && funder.url.as_deref() == Some(name_or_url) {
            funder.id = Some(name_or_url.to_string());
        }

        if let Some(grant) = grant {
            funding.grants.push(Grant::new(grant, funder.clone()));
        }
        if !funding.funders.contains(&funder) {
            funding.funders.push(funder);
        }
    }

    Resolved { value: funding, log }
}
