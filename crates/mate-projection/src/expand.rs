//! List broadcasting
//!
//! A table entry such as `creators.name ← creators.givenName` is written once
//! but has to fill one target entry per creator. Before anything is assigned
//! the table is expanded against the record: wherever a source path runs into
//! a sequence, the entry is replaced by one entry per element, with the
//! element index inserted into both paths at the same depth.
//!
//! A `#` segment marks the broadcast point explicitly
//! (`people.#.label ← authors.#.name`). Without one, the first sequence the
//! source path traverses is used.

use crate::error::{parse_path, ProjectionResult};
use mate_record::{FieldMapping, FieldPath, Segment, SourceSpec};
use serde_json::Value;

/// Where one table entry takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Never auto-filled; the target gets an empty string
    Unmapped,
    /// One source path
    Single(FieldPath),
    /// Several source paths collected into a list
    Many(Vec<FieldPath>),
}

/// One parsed row of the projection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// Path in the target document
    pub target: FieldPath,
    /// Path(s) in the submission record
    pub source: EntrySource,
}

/// Parsed projection table, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionTable {
    entries: Vec<TableEntry>,
}

impl ProjectionTable {
    /// Parse a mapping table
    ///
    /// # Errors
    /// Returns the first malformed target or source path.
    pub fn from_mapping(mapping: &FieldMapping) -> ProjectionResult<Self> {
        let entries = mapping
            .iter()
            .map(|(target, source)| {
                let source = match source {
                    None => EntrySource::Unmapped,
                    Some(SourceSpec::Path(path)) => EntrySource::Single(parse_path(path)?),
                    Some(SourceSpec::Paths(paths)) => {
                        EntrySource::Many(paths.iter().map(|p| parse_path(p)).collect::<Result<_, _>>()?)
                    }
                };
                Ok(TableEntry {
                    target: parse_path(target)?,
                    source,
                })
            })
            .collect::<ProjectionResult<_>>()?;
        Ok(Self { entries })
    }

    /// Table rows
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concrete assignment produced by expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded {
    /// Copy a value (or an empty string) into `target`
    Assign {
        /// Concrete target path
        target: FieldPath,
        /// Concrete source
        source: EntrySource,
    },
    /// The broadcast list is empty or absent; `target` becomes `[]`
    EmptyList {
        /// Path of the list in the target document
        target: FieldPath,
        /// Whether the source list was absent rather than empty
        missing: bool,
    },
}

/// Expand every table row against `record`
#[must_use]
pub fn expand_table(record: &Value, table: &ProjectionTable) -> Vec<Expanded> {
    let mut out = Vec::with_capacity(table.len());
    for entry in table.entries() {
        match &entry.source {
            EntrySource::Single(source) => expand_single(record, entry.target.clone(), source.clone(), &mut out),
            other => out.push(Expanded::Assign {
                target: entry.target.clone(),
                source: other.clone(),
            }),
        }
    }
    out
}

struct Broadcast {
    depth: usize,
    len: usize,
    explicit: bool,
    missing: bool,
}

/// First point where `source` crosses a sequence
///
/// A wildcard path whose list cannot be reached still broadcasts, over
/// nothing.
fn broadcast_point(record: &Value, source: &FieldPath) -> Option<Broadcast> {
    walk_to_list(record, source).or_else(|| {
        source.first_wildcard().map(|depth| Broadcast {
            depth,
            len: 0,
            explicit: true,
            missing: true,
        })
    })
}

fn walk_to_list(record: &Value, source: &FieldPath) -> Option<Broadcast> {
    let mut current = record;
    for (depth, segment) in source.iter().enumerate() {
        current = match (segment, current) {
            (Segment::Wildcard, Value::Array(items)) => {
                return Some(Broadcast {
                    depth,
                    len: items.len(),
                    explicit: true,
                    missing: false,
                })
            }
            (Segment::Wildcard, _) => {
                return Some(Broadcast {
                    depth,
                    len: 0,
                    explicit: true,
                    missing: true,
                })
            }
            (Segment::Key(_), Value::Array(items)) if depth > 0 => {
                return Some(Broadcast {
                    depth,
                    len: items.len(),
                    explicit: false,
                    missing: false,
                })
            }
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    None
}

fn insert_index(path: &FieldPath, at: usize, index: usize) -> FieldPath {
    let mut segments = path.segments().to_vec();
    segments.insert(at.min(segments.len()), Segment::Index(index));
    FieldPath::new(segments)
}

/// Position in `target` matching source depth `depth`
fn target_position(target: &FieldPath, depth: usize) -> usize {
    if let Some(pos) = target.first_wildcard() {
        return pos;
    }
    if target.len() > 1 {
        depth.min(target.len() - 1)
    } else {
        target.len()
    }
}

fn expand_single(record: &Value, target: FieldPath, source: FieldPath, out: &mut Vec<Expanded>) {
    let Some(point) = broadcast_point(record, &source) else {
        out.push(Expanded::Assign {
            target,
            source: EntrySource::Single(source),
        });
        return;
    };

    let at = target_position(&target, point.depth);
    if point.len == 0 {
        out.push(Expanded::EmptyList {
            target: target.prefix(at),
            missing: point.missing,
        });
        return;
    }

    for index in 0..point.len {
        let source = if point.explicit {
            source.fill_wildcard(index)
        } else {
            insert_index(&source, point.depth, index)
        };
        let target = if target.has_wildcard() {
            target.fill_wildcard(index)
        } else {
            insert_index(&target, at, index)
        };
        // Deeper lists expand in turn
        expand_single(record, target, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table(rows: &[(&str, Option<SourceSpec>)]) -> ProjectionTable {
        let mapping: FieldMapping = rows.iter().map(|(t, s)| ((*t).to_string(), s.clone())).collect();
        ProjectionTable::from_mapping(&mapping).unwrap()
    }

    fn assigned(expanded: &[Expanded]) -> Vec<(String, String)> {
        expanded
            .iter()
            .filter_map(|e| match e {
                Expanded::Assign {
                    target,
                    source: EntrySource::Single(source),
                } => Some((target.to_string(), source.to_string())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn implicit_broadcast_inserts_matching_indices() {
        let record = json!({"creators": [{"givenName": "A"}, {"givenName": "B"}]});
        let expanded = expand_table(&record, &table(&[("creators.name", Some("creators.givenName".into()))]));
        assert_eq!(
            assigned(&expanded),
            vec![
                ("creators.0.name".to_string(), "creators.0.givenName".to_string()),
                ("creators.1.name".to_string(), "creators.1.givenName".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_wildcards_are_filled() {
        let record = json!({"authors": [{"name": "A"}, {"name": "B"}, {"name": "C"}]});
        let expanded = expand_table(&record, &table(&[("people.#.label", Some("authors.#.name".into()))]));
        assert_eq!(
            assigned(&expanded),
            vec![
                ("people.0.label".to_string(), "authors.0.name".to_string()),
                ("people.1.label".to_string(), "authors.1.name".to_string()),
                ("people.2.label".to_string(), "authors.2.name".to_string()),
            ]
        );
    }

    #[test]
    fn whole_list_is_copied_when_path_ends_on_it() {
        let record = json!({"keywords": ["basalt", "mantle"]});
        let expanded = expand_table(&record, &table(&[("research_tags", Some("keywords".into()))]));
        assert_eq!(
            assigned(&expanded),
            vec![("research_tags".to_string(), "keywords".to_string())]
        );
    }

    #[test]
    fn single_segment_target_gets_index_appended() {
        let record = json!({"software": [{"name": "x"}, {"name": "y"}]});
        let expanded = expand_table(&record, &table(&[("tools", Some("software.name".into()))]));
        assert_eq!(
            assigned(&expanded),
            vec![
                ("tools.0".to_string(), "software.0.name".to_string()),
                ("tools.1".to_string(), "software.1.name".to_string()),
            ]
        );
    }

    #[test]
    fn nested_lists_expand_recursively() {
        let record = json!({"creators": [
            {"affiliation": [{"name": "ANU"}, {"name": "CSIRO"}]},
            {"affiliation": [{"name": "UoM"}]}
        ]});
        let expanded = expand_table(
            &record,
            &table(&[("people.#.orgs.#.label", Some("creators.#.affiliation.#.name".into()))]),
        );
        assert_eq!(
            assigned(&expanded),
            vec![
                ("people.0.orgs.0.label".to_string(), "creators.0.affiliation.0.name".to_string()),
                ("people.0.orgs.1.label".to_string(), "creators.0.affiliation.1.name".to_string()),
                ("people.1.orgs.0.label".to_string(), "creators.1.affiliation.0.name".to_string()),
            ]
        );
    }

    #[test]
    fn empty_and_absent_lists_become_empty_targets() {
        let record = json!({"contributors": []});
        let expanded = expand_table(
            &record,
            &table(&[
                ("contributors.name", Some("contributors.givenName".into())),
                ("people.#.label", Some("authors.#.name".into())),
            ]),
        );
        assert_eq!(
            expanded,
            vec![
                Expanded::EmptyList {
                    target: "contributors".parse().unwrap(),
                    missing: false,
                },
                Expanded::EmptyList {
                    target: "people".parse().unwrap(),
                    missing: true,
                },
            ]
        );
    }

    #[test]
    fn unmapped_and_many_pass_through() {
        let record = json!({});
        let expanded = expand_table(
            &record,
            &table(&[("templateKey", None), ("links", Some(vec!["a", "b"].into()))]),
        );
        assert_eq!(expanded.len(), 2);
        assert!(matches!(
            &expanded[0],
            Expanded::Assign { source: EntrySource::Unmapped, .. }
        ));
        assert!(matches!(
            &expanded[1],
            Expanded::Assign { source: EntrySource::Many(paths), .. } if paths.len() == 2
        ));
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let mapping: FieldMapping = [("a..b".to_string(), Some(SourceSpec::from("x")))].into_iter().collect();
        assert!(ProjectionTable::from_mapping(&mapping).is_err());
    }
}
