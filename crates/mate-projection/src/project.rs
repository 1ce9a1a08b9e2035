//! Generic projection
//!
//! Applies an expanded table to a record. Every target receives a value:
//! a source that resolves to nothing yields an empty string plus a warning,
//! and unmapped targets yield an empty string silently.

use crate::expand::{expand_table, EntrySource, Expanded, ProjectionTable};
use mate_record::access::{assign, lookup};
use mate_record::FieldPath;
use serde_json::{Map, Value};
use tracing::debug;

/// Draft document plus the warnings raised building it
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Draft presentation document
    pub document: Value,
    /// One line per unresolved source
    pub warnings: Vec<String>,
}

fn resolve<'a>(record: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    lookup(record, path).filter(|v| !v.is_null())
}

fn missing_warning(source: &FieldPath, target: &FieldPath) -> String {
    format!("Key '{source}' not found in record. Assigning empty string to '{target}'.")
}

/// Project `record` through `table`
#[must_use]
pub fn project(record: &Value, table: &ProjectionTable) -> Projection {
    let mut document = Value::Object(Map::new());
    let mut warnings = Vec::new();

    for expanded in expand_table(record, table) {
        match expanded {
            Expanded::Assign {
                target,
                source: EntrySource::Unmapped,
            } => assign(&mut document, &target, Value::String(String::new())),
            Expanded::Assign {
                target,
                source: EntrySource::Single(source),
            } => {
                let value = match resolve(record, &source) {
                    Some(value) => value.clone(),
                    None => {
                        warnings.push(missing_warning(&source, &target));
                        Value::String(String::new())
                    }
                };
                assign(&mut document, &target, value);
            }
            Expanded::Assign {
                target,
                source: EntrySource::Many(sources),
            } => {
                let mut values = Vec::with_capacity(sources.len());
                for source in &sources {
                    match resolve(record, source) {
                        Some(value) => values.push(value.clone()),
                        None => warnings.push(format!("Key '{source}' not found in record. Skipping it for '{target}'.")),
                    }
                }
                assign(&mut document, &target, Value::Array(values));
            }
            Expanded::EmptyList { target, missing } => {
                if missing {
                    warnings.push(format!("Key '{target}' not found in record. Assigning empty list."));
                }
                if lookup(&document, &target).is_none() {
                    assign(&mut document, &target, Value::Array(Vec::new()));
                }
            }
        }
    }

    debug!(warnings = warnings.len(), "record projected");
    Projection { document, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mate_record::{FieldMapping, SourceSpec};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table(rows: &[(&str, Option<SourceSpec>)]) -> ProjectionTable {
        let mapping: FieldMapping = rows.iter().map(|(t, s)| ((*t).to_string(), s.clone())).collect();
        ProjectionTable::from_mapping(&mapping).unwrap()
    }

    #[test]
    fn broadcast_preserves_order() {
        let record = json!({"authors": [{"name": "A"}, {"name": "B"}]});
        let out = project(&record, &table(&[("people.#.label", Some("authors.#.name".into()))]));
        assert_eq!(out.document, json!({"people": [{"label": "A"}, {"label": "B"}]}));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn people_fields_merge_per_index() {
        let record = json!({"creators": [
            {"@id": "https://orcid.org/0000-0001-2345-6789", "givenName": "Jane", "familyName": "Doe"},
            {"givenName": "Li", "familyName": "Wei"}
        ]});
        let out = project(
            &record,
            &table(&[
                ("creators.name", Some("creators.givenName".into())),
                ("creators.family_name", Some("creators.familyName".into())),
                ("creators.ORCID", Some("creators.@id".into())),
            ]),
        );
        assert_eq!(
            out.document,
            json!({"creators": [
                {"name": "Jane", "family_name": "Doe", "ORCID": "https://orcid.org/0000-0001-2345-6789"},
                {"name": "Li", "family_name": "Wei", "ORCID": ""}
            ]})
        );
        assert_eq!(
            out.warnings,
            vec!["Key 'creators.1.@id' not found in record. Assigning empty string to 'creators.1.ORCID'.".to_string()]
        );
    }

    #[test]
    fn missing_and_unmapped_become_empty_strings() {
        let record = json!({"title": "Mantle convection"});
        let out = project(
            &record,
            &table(&[
                ("title", Some("title".into())),
                ("templateKey", None),
                ("licence.name", Some("license.name".into())),
            ]),
        );
        assert_eq!(
            out.document,
            json!({"title": "Mantle convection", "templateKey": "", "licence": {"name": ""}})
        );
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("'license.name'"));
    }

    #[test]
    fn list_sources_collect_found_values() {
        let record = json!({"software": {"@id": "10.5281/zenodo.1"}, "computer_uri": "https://nci.org.au"});
        let out = project(
            &record,
            &table(&[("instrument", Some(vec!["software.@id", "computer_uri", "absent"].into()))]),
        );
        assert_eq!(out.document, json!({"instrument": ["10.5281/zenodo.1", "https://nci.org.au"]}));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn empty_role_lists_stay_lists() {
        let record = json!({"contributors": []});
        let out = project(
            &record,
            &table(&[
                ("contributors.name", Some("contributors.givenName".into())),
                ("contributors.ORCID", Some("contributors.@id".into())),
            ]),
        );
        assert_eq!(out.document, json!({"contributors": []}));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn numeric_segments_build_lists() {
        let record = json!({"keywords": ["a", "b"]});
        let out = project(&record, &table(&[("tags.1", Some("keywords.0".into()))]));
        assert_eq!(out.document, json!({"tags": ["", "a"]}));
    }
}
