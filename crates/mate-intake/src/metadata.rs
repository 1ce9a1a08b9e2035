//! Registry metadata normalization
//!
//! Registries answer either with a JSON-LD entity, which is used as is, or
//! with their own JSON dialect, which is reshaped into schema.org terms here.
//! See [`Metadata::classify`].

use mate_record::{FieldError, FieldResult, IdentityRecord, Metadata};
use serde_json::{json, Map, Value};

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn first_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Crossref `date-parts` → `Y-M-D` without zero padding
fn date_parts(value: &Value) -> Option<String> {
    let parts = value.pointer("/date-parts/0")?.as_array()?;
    let text: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
    (!text.is_empty()).then(|| text.join("-"))
}

/// First `<jats:p>` paragraph, or the whole text when untagged
fn strip_jats(text: &str) -> String {
    text.split_once("<jats:p>")
        .map(|(_, rest)| rest.split("</jats:p>").next().unwrap_or(rest))
        .unwrap_or(text)
        .trim()
        .to_string()
}

fn organization_named(name: &str) -> IdentityRecord {
    IdentityRecord::organization(name)
}

/// ORCID person record → schema.org Person
///
/// Affiliations are the current employments (no end date).
///
/// # Errors
/// [`FieldError::Malformed`] when the identifier or given names are missing.
pub fn normalize_author(metadata: Metadata) -> FieldResult<Value> {
    let raw = match metadata {
        Metadata::Normalized(map) => return Ok(Value::Object(map)),
        Metadata::Raw(raw) => raw,
    };

    let malformed = |what: &str| FieldError::malformed(format!("unable to parse author metadata. `missing {what}`"));
    let id = str_at(&raw, "/orcid-identifier/uri").ok_or_else(|| malformed("orcid-identifier"))?;
    let given = str_at(&raw, "/person/name/given-names/value").ok_or_else(|| malformed("given-names"))?;
    let family = str_at(&raw, "/person/name/family-name/value").unwrap_or_default();

    let affiliation = raw
        .pointer("/activities-summary/employments/affiliation-group")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|group| group.pointer("/summaries/0/employment-summary"))
        .filter(|summary| summary.get("end-date").map_or(true, Value::is_null))
        .filter_map(|summary| str_at(summary, "/organization/name"))
        .map(organization_named)
        .collect();

    let person = IdentityRecord::person(family, given)
        .with_id(id)
        .with_affiliation(affiliation);
    Ok(person.to_value())
}

/// ROR organization record → schema.org Organization
///
/// Accepts both the v1 `name` field and the v2 `names` list.
///
/// # Errors
/// [`FieldError::Malformed`] when id or name are missing.
pub fn normalize_organization(metadata: Metadata) -> FieldResult<Value> {
    let raw = match metadata {
        Metadata::Normalized(map) => return Ok(Value::Object(map)),
        Metadata::Raw(raw) => raw,
    };

    let id = str_at(&raw, "/id")
        .ok_or_else(|| FieldError::malformed("unable to parse organization metadata. `missing id`"))?;
    let name = str_at(&raw, "/name")
        .or_else(|| {
            raw.get("names")?.as_array()?.iter().find_map(|n| {
                let display = n.get("types")?.as_array()?.iter().any(|t| t == "ror_display");
                display.then(|| n.get("value")?.as_str()).flatten()
            })
        })
        .ok_or_else(|| FieldError::malformed("unable to parse organization metadata. `missing name`"))?;

    Ok(IdentityRecord::organization(name).with_id(id).to_value())
}

/// Crossref work (under `message`) → schema.org ScholarlyArticle
///
/// # Errors
/// [`FieldError::Malformed`] when the work has no URL or title.
pub fn normalize_publication(metadata: Metadata) -> FieldResult<Value> {
    let raw = match metadata {
        Metadata::Normalized(map) => return Ok(Value::Object(map)),
        Metadata::Raw(raw) => raw,
    };
    let work = if raw.get("message").is_some() { raw["message"].clone() } else { raw };
    if let Metadata::Normalized(map) = Metadata::classify(work.clone()) {
        return Ok(Value::Object(map));
    }

    let malformed = |what: &str| FieldError::malformed(format!("unable to parse publication metadata. `missing {what}`"));
    let url = str_at(&work, "/URL").ok_or_else(|| malformed("URL"))?;
    let title = work.get("title").and_then(first_str).ok_or_else(|| malformed("title"))?;

    let mut article = Map::new();
    article.insert("@type".into(), json!("ScholarlyArticle"));
    article.insert("@id".into(), json!(url));
    article.insert("name".into(), json!(title));

    let published = work.get("published").and_then(date_parts);
    if let Some(issue) = work.get("issue") {
        let mut periodical = Map::new();
        periodical.insert("@type".into(), json!(["PublicationVolume", "Periodical"]));
        for (target, source) in [
            ("name", "container-title"),
            ("issn", "ISSN"),
            ("volumeNumber", "volume"),
            ("publisher", "publisher"),
        ] {
            if let Some(value) = work.get(source) {
                periodical.insert(target.into(), value.clone());
            }
        }

        let mut publication_issue = Map::new();
        publication_issue.insert("@type".into(), json!("PublicationIssue"));
        publication_issue.insert("issueNumber".into(), issue.clone());
        if let Some(date) = &published {
            publication_issue.insert("datePublished".into(), json!(date));
        }
        publication_issue.insert("isPartOf".into(), Value::Object(periodical));
        article.insert("isPartOf".into(), json!([publication_issue]));
    } else {
        if let Some(date) = &published {
            article.insert("datePublished".into(), json!(date));
        }
        if let Some(publisher) = str_at(&work, "/publisher") {
            article.insert("publisher".into(), json!(publisher));
        }
    }

    let authors: Vec<Value> = work
        .get("author")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|author| {
            let mut person = IdentityRecord::person(
                str_at(author, "/family").unwrap_or_default(),
                str_at(author, "/given").unwrap_or_default(),
            );
            person.id = str_at(author, "/ORCID").map(str::to_string);
            person.affiliation = author
                .get("affiliation")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|a| str_at(a, "/name"))
                .map(organization_named)
                .collect();
            person.to_value()
        })
        .collect();
    if !authors.is_empty() {
        article.insert("author".into(), Value::Array(authors));
    }

    if let Some(text) = str_at(&work, "/abstract") {
        article.insert("abstract".into(), json!(strip_jats(text)));
    }
    if let Some(page) = work.get("page") {
        article.insert("pagination".into(), page.clone());
    }
    if let Some(alternative) = work.get("alternative-id") {
        article.insert("identifier".into(), alternative.clone());
    }
    if let Some(funders) = work.get("funder").and_then(Value::as_array) {
        let funders: Vec<Value> = funders
            .iter()
            .filter_map(|f| str_at(f, "/name"))
            .map(|name| organization_named(name).to_value())
            .collect();
        article.insert("funder".into(), Value::Array(funders));
    }

    Ok(Value::Object(article))
}

/// DOI-resolved software record → schema.org SoftwareApplication
///
/// # Errors
/// [`FieldError::Malformed`] when neither title, version nor creators are
/// present.
pub fn normalize_software(metadata: Metadata, doi: &str) -> FieldResult<Value> {
    let raw = match metadata {
        Metadata::Normalized(map) => return Ok(Value::Object(map)),
        Metadata::Raw(raw) => raw,
    };

    let mut software = software_stub(doi);
    let mut found_something = false;

    if let Some(title) = raw.get("title").and_then(first_str) {
        software.insert("name".into(), json!(title));
        found_something = true;
    }
    if let Some(version) = raw.pointer("/metadata/version").filter(|v| !v.is_null()) {
        software.insert("softwareVersion".into(), version.clone());
        found_something = true;
    }

    let authors: Vec<Value> = raw
        .pointer("/metadata/creators")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(software_author)
        .collect();
    if !authors.is_empty() {
        software.insert("author".into(), Value::Array(authors));
        found_something = true;
    }

    if found_something {
        Ok(Value::Object(software))
    } else {
        Err(FieldError::malformed("unable to parse software metadata."))
    }
}

/// Minimal SoftwareApplication carrying only its DOI
#[must_use]
pub fn software_stub(doi: &str) -> Map<String, Value> {
    let mut software = Map::new();
    software.insert("@type".into(), json!("SoftwareApplication"));
    if !doi.is_empty() {
        software.insert("@id".into(), json!(doi));
    }
    software
}

fn software_author(creator: &Value) -> Value {
    let mut person = Map::new();
    person.insert("@type".into(), json!("Person"));
    if let Some(orcid) = str_at(creator, "/orcid") {
        person.insert("@id".into(), json!(orcid));
    }
    match (str_at(creator, "/given"), str_at(creator, "/family"), str_at(creator, "/name")) {
        (Some(given), Some(family), _) => {
            person.insert("givenName".into(), json!(given));
            person.insert("familyName".into(), json!(family));
        }
        (_, _, Some(name)) => {
            person.insert("name".into(), json!(name));
        }
        _ => {}
    }
    match creator.get("affiliation") {
        Some(Value::String(name)) if !name.is_empty() => {
            person.insert("affiliation".into(), organization_named(name).to_value());
        }
        Some(other @ (Value::Object(_) | Value::Array(_))) => {
            person.insert("affiliation".into(), other.clone());
        }
        _ => {}
    }
    Value::Object(person)
}
