//! Presentation-schema finishing rules
//!
//! The website front matter has requirements that the generic projection
//! cannot express: some fields must always be lists, identifiers must be bare,
//! image paths must point into the graphics directory and a few publication
//! fields come from deep inside the publication record. Rule paths may use `#`
//! to reach every element of a list or every value of a mapping.

use crate::error::{parse_path, ProjectionResult};
use mate_record::access::{assign, lookup};
use mate_record::identity::coerce_orcid;
use mate_record::{FieldPath, Segment};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Fields derived from the publication record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationRule {
    /// Publication object in the target document
    pub target: String,
    /// Publication object in the submission record
    pub source: String,
}

impl Default for PublicationRule {
    fn default() -> Self {
        Self {
            target: "associated_publication".into(),
            source: "publication".into(),
        }
    }
}

/// Finishing rules for the website front matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishingRules {
    /// Field holding the page template name
    pub template_key_field: String,
    /// Page template name
    pub template_key: String,
    /// Field receiving the run timestamp
    pub timestamp_field: String,
    /// Fields that must always be lists
    pub list_fields: Vec<String>,
    /// Fields holding ORCID identifiers
    pub identifier_fields: Vec<String>,
    /// Fields reduced to a list of integers
    pub integer_fields: Vec<String>,
    /// Fields whose empty string becomes `null`
    pub null_when_empty: Vec<String>,
    /// Image path fields
    pub image_fields: Vec<String>,
    /// Prefix for relative image paths
    pub image_base: String,
    /// Publication-derived fields
    pub publication: Option<PublicationRule>,
}

impl Default for FinishingRules {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();
        Self {
            template_key_field: "templateKey".into(),
            template_key: "model".into(),
            timestamp_field: "date".into(),
            list_fields: owned(&["creators", "contributors", "software", "research_tags"]),
            identifier_fields: owned(&["creators.#.ORCID", "contributors.#.ORCID", "submitter.ORCID"]),
            integer_fields: owned(&["for_codes"]),
            null_when_empty: owned(&["images.#.src", "animation.src"]),
            image_fields: owned(&["images.#.src", "animation.src"]),
            image_base: "./graphics/".into(),
            publication: Some(PublicationRule::default()),
        }
    }
}

fn parse_all(raw: &[String]) -> ProjectionResult<Vec<FieldPath>> {
    raw.iter().map(|p| parse_path(p)).collect()
}

/// Finishing rules with parsed paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finisher {
    rules: FinishingRules,
    lists: Vec<FieldPath>,
    identifiers: Vec<FieldPath>,
    integers: Vec<FieldPath>,
    nullable: Vec<FieldPath>,
    images: Vec<FieldPath>,
}

impl Finisher {
    /// Parse the rule paths
    ///
    /// # Errors
    /// Returns the first malformed path.
    pub fn new(rules: FinishingRules) -> ProjectionResult<Self> {
        Ok(Self {
            lists: parse_all(&rules.list_fields)?,
            identifiers: parse_all(&rules.identifier_fields)?,
            integers: parse_all(&rules.integer_fields)?,
            nullable: parse_all(&rules.null_when_empty)?,
            images: parse_all(&rules.image_fields)?,
            rules,
        })
    }

    /// Get the underlying rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &FinishingRules {
        &self.rules
    }

    /// Apply every rule to a projected document
    #[must_use]
    pub fn apply(&self, mut document: Value, record: &Value, timestamp: &str) -> Value {
        if !document.is_object() {
            document = Value::Object(Map::new());
        }
        let key = FieldPath::key(self.rules.template_key_field.clone());
        assign(&mut document, &key, Value::String(self.rules.template_key.clone()));
        let date = FieldPath::key(self.rules.timestamp_field.clone());
        assign(&mut document, &date, Value::String(timestamp.to_string()));

        for path in &self.identifiers {
            for_each_at(&mut document, path.segments(), &mut |value| {
                if let Some(orcid) = value.as_str().and_then(coerce_orcid) {
                    *value = Value::String(orcid);
                }
            });
        }

        for path in &self.integers {
            for_each_at(&mut document, path.segments(), &mut |value| {
                *value = Value::Array(extract_integers(value).into_iter().map(Value::from).collect());
            });
        }

        for path in &self.lists {
            if path.has_wildcard() {
                for_each_at(&mut document, path.segments(), &mut force_list);
            } else {
                let mut value = lookup(&document, path).cloned().unwrap_or(Value::Null);
                force_list(&mut value);
                assign(&mut document, path, value);
            }
        }

        for path in &self.nullable {
            for_each_at(&mut document, path.segments(), &mut |value| {
                if value.as_str() == Some("") {
                    *value = Value::Null;
                }
            });
        }

        for path in &self.images {
            for_each_at(&mut document, path.segments(), &mut |value| {
                if let Some(src) = value.as_str() {
                    *value = Value::String(ensure_prefix(src, &self.rules.image_base));
                }
            });
        }

        if let Some(rule) = &self.rules.publication {
            derive_publication(&mut document, record, rule);
        }
        document
    }
}

/// Visit every existing value at `segments`
fn for_each_at(value: &mut Value, segments: &[Segment], visit: &mut dyn FnMut(&mut Value)) {
    let Some((first, rest)) = segments.split_first() else {
        visit(value);
        return;
    };
    match (first, value) {
        (Segment::Key(key), Value::Object(map)) => {
            if let Some(child) = map.get_mut(key) {
                for_each_at(child, rest, visit);
            }
        }
        (Segment::Index(index), Value::Array(items)) => {
            if let Some(child) = items.get_mut(*index) {
                for_each_at(child, rest, visit);
            }
        }
        (Segment::Wildcard, Value::Array(items)) => {
            items.iter_mut().for_each(|child| for_each_at(child, rest, visit));
        }
        (Segment::Wildcard, Value::Object(map)) => {
            map.values_mut().for_each(|child| for_each_at(child, rest, visit));
        }
        _ => {}
    }
}

/// Wrap a value in a list; placeholders become an empty list
fn force_list(value: &mut Value) {
    match value {
        Value::Array(_) => {}
        Value::Null => *value = Value::Array(Vec::new()),
        Value::String(s) if s.is_empty() => *value = Value::Array(Vec::new()),
        _ => {
            let single = value.take();
            *value = Value::Array(vec![single]);
        }
    }
}

/// Integers named by a value
///
/// Numbers are kept; strings contribute every digit run of their last `/`
/// segment, so a code URI yields just its code.
#[must_use]
pub fn extract_integers(value: &Value) -> Vec<u64> {
    match value {
        Value::Number(n) => n.as_u64().into_iter().collect(),
        Value::String(s) => {
            let tail = s.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
            DIGITS.find_iter(tail).filter_map(|m| m.as_str().parse().ok()).collect()
        }
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_array())
            .flat_map(extract_integers)
            .collect(),
        _ => Vec::new(),
    }
}

/// Prefix a relative path with `base` unless already prefixed
#[must_use]
pub fn ensure_prefix(path: &str, base: &str) -> String {
    if path.starts_with(base) {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}

fn derive_publication(document: &mut Value, record: &Value, rule: &PublicationRule) {
    let Ok(source) = rule.source.parse::<FieldPath>() else {
        return;
    };
    let Ok(target) = rule.target.parse::<FieldPath>() else {
        return;
    };
    let Some(issue) = lookup(record, &source.child("isPartOf").child(0usize)) else {
        return;
    };
    let Some(Value::Object(_)) = lookup(document, &target) else {
        return;
    };

    let periodical = issue.get("isPartOf");
    let derived = [
        ("publisher", periodical.and_then(|p| p.get("publisher"))),
        ("journal", periodical.and_then(|p| p.get("name")).and_then(first_name)),
        ("date", issue.get("datePublished")),
    ];
    for (field, value) in derived {
        if let Some(value) = value.filter(|v| !v.is_null()) {
            assign(document, &target.child(field), value.clone());
        }
    }
}

fn first_name(name: &Value) -> Option<&Value> {
    match name {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn finisher() -> Finisher {
        Finisher::new(FinishingRules::default()).unwrap()
    }

    #[test]
    fn stamps_template_key_and_date() {
        let out = finisher().apply(json!({}), &json!({}), "2024-05-01T00:00:00.000Z");
        assert_eq!(out["templateKey"], "model");
        assert_eq!(out["date"], "2024-05-01T00:00:00.000Z");
    }

    #[test]
    fn coerces_orcids_and_leaves_others() {
        let doc = json!({
            "creators": [{"ORCID": "https://orcid.org/0000-0001-2345-6789"}, {"ORCID": "not an id"}],
            "submitter": {"ORCID": "0000000123456789"}
        });
        let out = finisher().apply(doc, &json!({}), "t");
        assert_eq!(out["creators"][0]["ORCID"], "0000-0001-2345-6789");
        assert_eq!(out["creators"][1]["ORCID"], "not an id");
        assert_eq!(out["submitter"]["ORCID"], "0000-0001-2345-6789");
    }

    #[test]
    fn for_codes_become_integers() {
        let doc = json!({"for_codes": ["https://linked.data.gov.au/def/anzsrc-for/2020/370401", "4013"]});
        let out = finisher().apply(doc, &json!({}), "t");
        assert_eq!(out["for_codes"], json!([370_401, 4013]));
        assert_eq!(extract_integers(&json!(37)), vec![37]);
        assert_eq!(extract_integers(&json!("37, 3704")), vec![37, 3704]);
    }

    #[test]
    fn list_fields_never_hold_placeholders() {
        let doc = json!({"software": {"name": "ASPECT"}, "research_tags": "", "creators": []});
        let out = finisher().apply(doc, &json!({}), "t");
        assert_eq!(out["software"], json!([{"name": "ASPECT"}]));
        assert_eq!(out["research_tags"], json!([]));
        assert_eq!(out["creators"], json!([]));
        assert_eq!(out["contributors"], json!([]));
    }

    #[test]
    fn image_paths_prefixed_and_empty_nulled() {
        let doc = json!({
            "images": {
                "landing_image": {"src": "landing.png", "caption": "Mantle"},
                "graphic_abstract": {"src": "./graphics/abstract.png", "caption": ""},
                "model_setup": {"src": "", "caption": ""}
            },
            "animation": {"src": "", "caption": ""}
        });
        let out = finisher().apply(doc, &json!({}), "t");
        assert_eq!(out["images"]["landing_image"]["src"], "./graphics/landing.png");
        assert_eq!(out["images"]["graphic_abstract"]["src"], "./graphics/abstract.png");
        assert_eq!(out["images"]["model_setup"]["src"], Value::Null);
        assert_eq!(out["images"]["graphic_abstract"]["caption"], "");
        assert_eq!(out["animation"]["src"], Value::Null);
    }

    #[test]
    fn publication_fields_derived_when_present() {
        let record = json!({"publication": {"isPartOf": [{
            "@type": "PublicationIssue",
            "datePublished": "2021-03-01",
            "isPartOf": {"name": ["Geophysical Journal International"], "publisher": "Oxford University Press"}
        }]}});
        let doc = json!({"associated_publication": {"title": "Plumes", "doi": "", "url": ""}});
        let out = finisher().apply(doc, &record, "t");
        assert_eq!(
            out["associated_publication"],
            json!({
                "title": "Plumes",
                "doi": "",
                "url": "",
                "publisher": "Oxford University Press",
                "journal": "Geophysical Journal International",
                "date": "2021-03-01"
            })
        );
    }

    #[test]
    fn publication_fields_skipped_when_absent() {
        let doc = json!({"associated_publication": {"title": ""}});
        let out = finisher().apply(doc, &json!({"publication": {"name": "x"}}), "t");
        assert_eq!(out["associated_publication"], json!({"title": ""}));
    }
}
