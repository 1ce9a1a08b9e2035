//! Declarative field mappings
//!
//! A mapping table pairs a target attribute (or dotted target path) with the
//! place in the submission record its value comes from. `None` marks a target
//! that is never auto-filled.

use crate::path::{FieldPath, PathError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a mapped value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    /// Single dotted source path
    Path(String),
    /// Several source paths, collected into a list
    Paths(Vec<String>),
}

impl SourceSpec {
    /// Source paths as text
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Path(path) => vec![path.as_str()],
            Self::Paths(paths) => paths.iter().map(String::as_str).collect(),
        }
    }

    /// Parse every source path
    ///
    /// # Errors
    /// Returns the first malformed path.
    pub fn parsed(&self) -> Result<Vec<FieldPath>, PathError> {
        self.paths().into_iter().map(str::parse).collect()
    }

    /// Whether the source collects into a list
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Paths(_))
    }
}

impl From<&str> for SourceSpec {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<Vec<&str>> for SourceSpec {
    fn from(paths: Vec<&str>) -> Self {
        Self::Paths(paths.into_iter().map(str::to_string).collect())
    }
}

/// Target path → source, in declaration order
pub type FieldMapping = IndexMap<String, Option<SourceSpec>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_accepts_single_list_and_null() {
        let yaml = "name: slug\ninstrument: [software, computer_uri]\npublisher: ~\n";
        let mapping: FieldMapping = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(mapping["name"], Some(SourceSpec::from("slug")));
        assert_eq!(mapping["instrument"], Some(SourceSpec::from(vec!["software", "computer_uri"])));
        assert_eq!(mapping["publisher"], None);
        // Declaration order survives
        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["name", "instrument", "publisher"]);
    }

    #[test]
    fn parsed_reports_bad_paths() {
        assert!(SourceSpec::from("a..b").parsed().is_err());
        assert_eq!(SourceSpec::from("a.0.b").parsed().unwrap().len(), 1);
    }
}
