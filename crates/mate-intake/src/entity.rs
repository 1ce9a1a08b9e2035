//! Entity resolution
//!
//! Turns names, ORCIDs and organization links into [`IdentityRecord`]s,
//! fetching registry records where an identifier is given. Resolution never
//! fails outright: the caller always gets a (possibly empty) result and the
//! log text explaining what went wrong.

use crate::metadata::{normalize_author, normalize_organization};
use crate::resolve::{OrganizationSearch, RecordKind, RecordResolver};
use mate_record::identity::{extract_orcid, is_orcid};
use mate_record::{IdentityRecord, Metadata};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::debug;

static ROR_URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://ror\.org/").expect("valid ROR regex"));
static ANY_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").expect("valid URL regex"));

/// Resolution result with its log text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved<T> {
    /// What was resolved
    pub value: T,
    /// Lookup diagnostics
    pub log: String,
}

impl<T> Resolved<T> {
    fn new(value: T, log: String) -> Self {
        Self { value, log }
    }
}

/// Whether a string is a ROR identifier URI
#[must_use]
pub fn is_ror_uri(input: &str) -> bool {
    ROR_URI.is_match(input)
}

/// Candidates whose identity does not already appear in `base`
///
/// Records without an id are always kept.
#[must_use]
pub fn deduplicate(base: &[IdentityRecord], candidates: Vec<IdentityRecord>) -> Vec<IdentityRecord> {
    let known: HashSet<String> = base.iter().filter_map(IdentityRecord::normalized_id).collect();
    candidates
        .into_iter()
        .filter(|c| c.normalized_id().map_or(true, |id| !known.contains(&id)))
        .collect()
}

/// Role assignment after deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles {
    /// Model creators, unchanged
    pub creators: Vec<IdentityRecord>,
    /// Contributors not already credited as creators
    pub contributors: Vec<IdentityRecord>,
}

/// Apply the submitter policy
///
/// Creators win over contributors; a submitter found in neither role is added
/// as a contributor.
#[must_use]
pub fn reconcile_roles(
    submitter: Option<&IdentityRecord>,
    creators: Vec<IdentityRecord>,
    contributors: Vec<IdentityRecord>,
) -> Roles {
    let mut contributors = deduplicate(&creators, contributors);

    if let Some(submitter) = submitter {
        let listed = creators
            .iter()
            .chain(contributors.iter())
            .any(|person| person.same_identity(submitter));
        if !listed {
            debug!(submitter = %submitter.display_name(), "adding submitter as contributor");
            contributors.push(submitter.clone());
        }
    }

    Roles { creators, contributors }
}

/// Resolves people and organizations against the registries
#[derive(Clone, Copy)]
pub struct EntityResolver<'a> {
    records: &'a dyn RecordResolver,
    organizations: &'a dyn OrganizationSearch,
}

impl std::fmt::Debug for EntityResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityResolver").finish_non_exhaustive()
    }
}

impl<'a> EntityResolver<'a> {
    /// Create resolver over the given registries
    #[must_use]
    pub fn new(records: &'a dyn RecordResolver, organizations: &'a dyn OrganizationSearch) -> Self {
        Self { records, organizations }
    }

    /// Resolve one ORCID or `Family, Given` name
    pub async fn resolve_identity(&self, input: &str) -> Resolved<Option<IdentityRecord>> {
        let input = input.trim();

        if is_orcid(input) {
            let orcid = extract_orcid(input).unwrap_or_else(|| input.to_string());
            return self.fetch_person(&orcid).await;
        }

        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [family, given] if !family.is_empty() && !given.is_empty() => {
                Resolved::new(Some(IdentityRecord::person(*family, *given)), String::new())
            }
            _ => Resolved::new(
                None,
                format!(
                    "- Error: name `{input}` in unexpected format. Expected `last name(s), first name(s)` or ORCID. \n"
                ),
            ),
        }
    }

    async fn fetch_person(&self, orcid: &str) -> Resolved<Option<IdentityRecord>> {
        let fetched = self.records.get_record(RecordKind::Author, orcid).await;
        let mut log = fetched.log.clone();

        if fetched.is_empty() {
            let _ = writeln!(log, "Error: unable to obtain ORCID record for `{orcid}` ");
            return Resolved::new(None, log);
        }

        let person = match normalize_author(Metadata::classify(fetched.metadata)) {
            Ok(value) => IdentityRecord::from_value(&value),
            Err(err) => {
                let _ = writeln!(log, "Error: {err} ");
                return Resolved::new(None, log);
            }
        };
        if person.is_none() {
            let _ = writeln!(log, "Error: ORCID record for `{orcid}` is not a Person ");
        }
        Resolved::new(person, log)
    }

    /// Resolve a newline-separated list of ORCIDs and names
    ///
    /// When the first line is ORCID-shaped every line is reduced to its bare
    /// ORCID before resolving.
    pub async fn resolve_list(&self, block: &str) -> Resolved<Vec<IdentityRecord>> {
        let lines: Vec<&str> = block.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let strip = lines.first().is_some_and(|first| is_orcid(first));

        let mut people = Vec::new();
        let mut log = String::new();
        for line in lines {
            let input = if strip {
                extract_orcid(line).unwrap_or_else(|| line.to_string())
            } else {
                line.to_string()
            };
            let resolved = self.resolve_identity(&input).await;
            log.push_str(&resolved.log);
            people.extend(resolved.value);
        }

        Resolved::new(people, log)
    }

    /// Resolve an organization from a ROR URI, a website URL or a name
    ///
    /// Websites are searched in ROR by link. Anything that cannot be resolved
    /// becomes a minimal Organization built from the literal input.
    pub async fn resolve_organization(&self, name_or_url: &str) -> Resolved<IdentityRecord> {
        let input = name_or_url.trim();

        if is_ror_uri(input) {
            return self.fetch_organization(input).await;
        }

        if ANY_URL.is_match(input) {
            let found = self.organizations.search_organization(input).await;
            let mut log = found.log;
            return match found.ror_id {
                Some(ror_id) => {
                    let resolved = self.fetch_organization(&ror_id).await;
                    log.push_str(&resolved.log);
                    Resolved::new(resolved.value, log)
                }
                None => Resolved::new(IdentityRecord::organization(input).with_url(input), log),
            };
        }

        Resolved::new(IdentityRecord::organization(input), String::new())
    }

    async fn fetch_organization(&self, ror_id: &str) -> Resolved<IdentityRecord> {
        let fetched = self.records.get_record(RecordKind::Organization, ror_id).await;
        let mut log = fetched.log.clone();
        let minimal = || IdentityRecord {
            name: None,
            ..IdentityRecord::organization("").with_id(ror_id)
        };

        if fetched.is_empty() {
            let _ = writeln!(log, "Error: unable to obtain ROR record for `{ror_id}` ");
            return Resolved::new(minimal(), log);
        }

        match normalize_organization(Metadata::classify(fetched.metadata)) {
            Ok(value) => match IdentityRecord::from_value(&value) {
                Some(org) => Resolved::new(org, log),
                None => {
                    let _ = writeln!(log, "Error: ROR record for `{ror_id}` is not an Organization ");
                    Resolved::new(minimal(), log)
                }
            },
            Err(err) => {
                let _ = writeln!(log, "Error: {err} ");
                Resolved::new(minimal(), log)
            }
        }
    }
}
