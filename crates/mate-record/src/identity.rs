//! Identity records for people and organizations
//!
//! An identity is "the same" as another only when both carry a normalized
//! external identifier and those identifiers are equal. ORCID identifiers are
//! compared in their bare `0000-0000-0000-000X` form, anything else as an
//! opaque string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bare ORCID, anchored
static ORCID_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[0-9X]$").expect("valid ORCID regex"));

/// ORCID with optional resolver prefix, anchored at the start
static ORCID_PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://orcid\.org/)?([0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{3}[0-9X])")
        .expect("valid ORCID URI regex")
});

/// ORCID anywhere in a string
static ORCID_ANYWHERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{4}-\d{4}-\d{3}[0-9X]").expect("valid ORCID regex"));

/// Sixteen digits without separators
static ORCID_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{15,16}").expect("valid digits regex"));

/// Identity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKind {
    /// schema.org Person
    Person,
    /// schema.org Organization
    Organization,
}

impl IdentityKind {
    /// schema.org type name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organization => "Organization",
        }
    }
}

/// Person or organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Person or Organization
    #[serde(rename = "@type")]
    pub kind: IdentityKind,

    /// Normalized external identifier (ORCID or ROR URI)
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Given name(s)
    #[serde(rename = "givenName", default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    /// Family name(s)
    #[serde(rename = "familyName", default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Display name, used for organizations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Affiliated organizations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliation: Vec<IdentityRecord>,
}

impl IdentityRecord {
    /// Person from name parts
    #[must_use]
    pub fn person(family_name: impl Into<String>, given_name: impl Into<String>) -> Self {
        Self {
            kind: IdentityKind::Person,
            id: None,
            given_name: Some(given_name.into()),
            family_name: Some(family_name.into()),
            name: None,
            url: None,
            affiliation: Vec::new(),
        }
    }

    /// Organization from a display name
    #[must_use]
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            kind: IdentityKind::Organization,
            id: None,
            given_name: None,
            family_name: None,
            name: Some(name.into()),
            url: None,
            affiliation: Vec::new(),
        }
    }

    /// With external identifier
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// With url
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// With affiliations
    #[inline]
    #[must_use]
    pub fn with_affiliation(mut self, affiliation: Vec<IdentityRecord>) -> Self {
        self.affiliation = affiliation;
        self
    }

    /// Identifier used for identity comparison
    ///
    /// ORCID-shaped ids reduce to the bare ORCID.
    #[must_use]
    pub fn normalized_id(&self) -> Option<String> {
        self.id.as_deref().map(normalize_identifier)
    }

    /// Whether both records name the same identity
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        match (self.normalized_id(), other.normalized_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Display name: `name`, else `Given Family`
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Read an identity out of an arbitrary JSON-LD object
    ///
    /// Unknown keys are ignored. Returns `None` for non-objects or objects
    /// whose `@type` is neither Person nor Organization.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let kind = match type_name(map.get("@type")?)?.as_str() {
            "Person" => IdentityKind::Person,
            "Organization" => IdentityKind::Organization,
            _ => return None,
        };
        let text = |key: &str| map.get(key).and_then(text_of);

        let affiliation = match map.get("affiliation") {
            Some(Value::Array(items)) => items.iter().filter_map(Self::from_value).collect(),
            Some(single @ Value::Object(_)) => Self::from_value(single).into_iter().collect(),
            _ => Vec::new(),
        };

        Some(Self {
            kind,
            id: text("@id"),
            given_name: text("givenName"),
            family_name: text("familyName"),
            name: text("name"),
            url: text("url"),
            affiliation,
        })
    }

    /// Serialize into a JSON object
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn type_name(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.iter().find_map(Value::as_str)?,
        _ => return None,
    };
    // `schema:Person` and `http://schema.org/Person` both name a Person
    Some(raw.rsplit([':', '/']).next().unwrap_or(raw).to_string())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Whether the whole string is a bare ORCID
#[must_use]
pub fn is_orcid_format(input: &str) -> bool {
    ORCID_EXACT.is_match(input)
}

/// Whether the string starts with an ORCID, with or without resolver prefix
#[must_use]
pub fn is_orcid(input: &str) -> bool {
    ORCID_PREFIXED.is_match(input)
}

/// Extract a bare ORCID from a bare id or an ORCID URI
#[must_use]
pub fn extract_orcid(input: &str) -> Option<String> {
    ORCID_PREFIXED
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Coerce an identifier to a bare ORCID, leniently
///
/// Accepts hyphenated ORCIDs anywhere in the text and runs of 15-16 digits
/// without separators.
#[must_use]
pub fn coerce_orcid(input: &str) -> Option<String> {
    if let Some(m) = ORCID_ANYWHERE.find(input) {
        return Some(m.as_str().to_string());
    }
    ORCID_DIGITS.find(input).map(|m| {
        let digits = m.as_str();
        format!("{}-{}-{}-{}", &digits[..4], &digits[4..8], &digits[8..12], &digits[12..])
    })
}

/// Reduce ORCID-shaped identifiers to the bare ORCID
#[must_use]
pub fn normalize_identifier(id: &str) -> String {
    if is_orcid(id) {
        extract_orcid(id).unwrap_or_else(|| id.to_string())
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn orcid_shapes() {
        assert!(is_orcid_format("0000-0001-2345-678X"));
        assert!(!is_orcid_format("https://orcid.org/0000-0001-2345-6789"));
        assert!(is_orcid("https://orcid.org/0000-0001-2345-6789"));
        assert!(is_orcid("http://orcid.org/0000-0001-2345-6789"));
        assert!(!is_orcid("Smith, Jane"));
    }

    #[test]
    fn extract_orcid_from_uri() {
        assert_eq!(
            extract_orcid("http://orcid.org/0000-0003-2198-9172").as_deref(),
            Some("0000-0003-2198-9172")
        );
        assert_eq!(extract_orcid("John Doe"), None);
    }

    #[test]
    fn coerce_orcid_accepts_unhyphenated_digits() {
        assert_eq!(coerce_orcid("0000000123456789").as_deref(), Some("0000-0001-2345-6789"));
        assert_eq!(
            coerce_orcid("https://orcid.org/0000-0001-2345-6789").as_deref(),
            Some("0000-0001-2345-6789")
        );
        assert_eq!(coerce_orcid("nope"), None);
    }

    #[test]
    fn same_identity_across_orcid_forms() {
        let a = IdentityRecord::person("Smith", "Jane").with_id("0000-0001-2345-6789");
        let b = IdentityRecord::person("Smith", "J.").with_id("https://orcid.org/0000-0001-2345-6789");
        assert!(a.same_identity(&b));
    }

    #[test]
    fn records_without_id_are_never_the_same() {
        let a = IdentityRecord::person("Smith", "Jane");
        assert!(!a.same_identity(&a.clone()));
    }

    #[test]
    fn serializes_with_json_ld_keys() {
        let person = IdentityRecord::person("Smith", "Jane").with_id("https://orcid.org/0000-0001-2345-6789");
        assert_eq!(
            person.to_value(),
            json!({
                "@type": "Person",
                "@id": "https://orcid.org/0000-0001-2345-6789",
                "givenName": "Jane",
                "familyName": "Smith"
            })
        );
    }

    #[test]
    fn from_value_reads_prefixed_types_and_affiliations() {
        let value = json!({
            "@type": "schema:Person",
            "@id": "https://orcid.org/0000-0001-2345-6789",
            "givenName": "Jane",
            "familyName": "Smith",
            "affiliation": {"@type": "Organization", "name": "ANU"},
            "email": "ignored@example.org"
        });
        let person = IdentityRecord::from_value(&value).unwrap();
        assert_eq!(person.kind, IdentityKind::Person);
        assert_eq!(person.affiliation.len(), 1);
        assert_eq!(person.display_name(), "Jane Smith");

        assert!(IdentityRecord::from_value(&json!({"@type": "Dataset"})).is_none());
    }
}
