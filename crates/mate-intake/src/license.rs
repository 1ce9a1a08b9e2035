//! License lookup table
//!
//! Maps the license names offered by the submission form to the record the
//! crate and website expect. The table ships as embedded YAML.

use indexmap::IndexMap;
use mate_record::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

const EMBEDDED: &str = include_str!("../resources/licenses.yaml");

/// Form choice meaning "no license"
pub const NO_LICENSE: &str = "No license";

const SUPPORTED_VERSION: u32 = 1;

/// One license row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Full license name
    pub name: String,
    /// License deed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Plain-text legal code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Badge image on the website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_path: Option<String>,
}

impl LicenseRecord {
    /// Record for an unlicensed model
    #[must_use]
    pub fn unlicensed() -> Self {
        Self {
            name: NO_LICENSE.to_string(),
            url: None,
            text: None,
            website_path: None,
        }
    }
}

/// License table keyed by form choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTable {
    version: u32,
    licenses: IndexMap<String, LicenseRecord>,
}

impl LicenseTable {
    /// Table shipped with the crate
    ///
    /// # Errors
    /// Fails only if the embedded resource is corrupt.
    pub fn embedded() -> FieldResult<Self> {
        Self::from_yaml(EMBEDDED)
    }

    /// Parse a table from YAML
    ///
    /// # Errors
    /// [`FieldError::Malformed`] on bad YAML, [`FieldError::Unsupported`] on
    /// an unknown table version.
    pub fn from_yaml(text: &str) -> FieldResult<Self> {
        let table: Self = serde_yaml::from_str(text)
            .map_err(|e| FieldError::malformed(format!("license table: {e}")))?;
        if table.version != SUPPORTED_VERSION {
            return Err(FieldError::unsupported(format!(
                "license table version {} (expected {SUPPORTED_VERSION})",
                table.version
            )));
        }
        Ok(table)
    }

    /// Resolve a form choice
    ///
    /// # Errors
    /// [`FieldError::Unsupported`] when the choice is not in the table.
    pub fn lookup(&self, choice: &str) -> FieldResult<LicenseRecord> {
        if choice == NO_LICENSE {
            return Ok(LicenseRecord::unlicensed());
        }
        self.licenses
            .get(choice)
            .cloned()
            .ok_or_else(|| FieldError::unsupported(format!("license `{choice}` not found in license table")))
    }

    /// Known form choices
    pub fn choices(&self) -> impl Iterator<Item = &str> {
        self.licenses.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_loads() {
        let table = LicenseTable::embedded().unwrap();
        let cc_by = table.lookup("CC BY 4.0").unwrap();
        assert_eq!(cc_by.url.as_deref(), Some("https://creativecommons.org/licenses/by/4.0/"));
        assert!(table.choices().count() >= 5);
    }

    #[test]
    fn no_license_is_name_only() {
        let table = LicenseTable::embedded().unwrap();
        assert_eq!(table.lookup(NO_LICENSE).unwrap(), LicenseRecord::unlicensed());
        assert_eq!(
            serde_json::to_value(LicenseRecord::unlicensed()).unwrap(),
            serde_json::json!({"name": "No license"})
        );
    }

    #[test]
    fn unknown_choice_and_version() {
        let table = LicenseTable::embedded().unwrap();
        assert!(matches!(table.lookup("WTFPL"), Err(FieldError::Unsupported(_))));
        assert!(matches!(
            LicenseTable::from_yaml("version: 9\nlicenses: {}\n"),
            Err(FieldError::Unsupported(_))
        ));
    }
}
