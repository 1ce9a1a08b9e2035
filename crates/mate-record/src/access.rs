//! Read and write nested JSON values by [`FieldPath`]
//!
//! Lookups traverse mappings by key and sequences by index. Assignment creates
//! intermediate containers on the way down, choosing a sequence when the next
//! segment is an index and a mapping otherwise.

use crate::path::{FieldPath, Segment};
use serde_json::{Map, Value};

/// Get value at path
///
/// Returns `None` when any segment is missing, an index is out of range, or
/// the path still contains a wildcard.
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.iter() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            // Objects keyed by digit strings
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get value at path, treating vacant values as absent
///
/// See [`is_vacant`].
#[must_use]
pub fn lookup_present<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    lookup(root, path).filter(|v| !is_vacant(v))
}

/// Whether a value carries no information
///
/// `null`, empty strings, empty sequences and empty mappings are vacant.
#[must_use]
pub fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Set value at path
///
/// Creates intermediate containers as needed. A container of the wrong shape
/// on the way down is replaced. Sequences are padded with `""` up to the
/// requested index.
pub fn assign(root: &mut Value, path: &FieldPath, value: Value) {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let next = segments.get(i + 1);
        current = descend(current, segment, next);
    }

    match last {
        Segment::Index(index) => {
            let items = ensure_array(current);
            if items.len() <= *index {
                items.resize(*index + 1, Value::String(String::new()));
            }
            items[*index] = value;
        }
        Segment::Key(key) => {
            ensure_object(current).insert(key.clone(), value);
        }
        Segment::Wildcard => {
            ensure_array(current).push(value);
        }
    }
}

fn descend<'a>(current: &'a mut Value, segment: &Segment, next: Option<&Segment>) -> &'a mut Value {
    let wants_array = matches!(next, Some(Segment::Index(_) | Segment::Wildcard));
    let child = match segment {
        Segment::Index(index) => {
            let items = ensure_array(current);
            if items.len() <= *index {
                items.resize(*index + 1, Value::String(String::new()));
            }
            &mut items[*index]
        }
        Segment::Key(key) => ensure_object(current)
            .entry(key.clone())
            .or_insert(Value::Null),
        Segment::Wildcard => {
            let items = ensure_array(current);
            items.push(Value::Null);
            let last = items.len() - 1;
            &mut items[last]
        }
    };

    if wants_array && !child.is_array() {
        *child = Value::Array(Vec::new());
    } else if !wants_array && !child.is_object() {
        *child = Value::Object(Map::new());
    }
    child
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was just replaced with an array"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(text: &str) -> FieldPath {
        text.parse().unwrap()
    }

    #[test]
    fn lookup_through_maps_and_lists() {
        let record = json!({
            "publication": {
                "name": "Basalt flows",
                "isPartOf": [{"datePublished": "2020-1-2"}]
            }
        });

        assert_eq!(lookup(&record, &path("publication.name")), Some(&json!("Basalt flows")));
        assert_eq!(
            lookup(&record, &path("publication.isPartOf.0.datePublished")),
            Some(&json!("2020-1-2"))
        );
        assert_eq!(lookup(&record, &path("publication.isPartOf.1")), None);
        assert_eq!(lookup(&record, &path("publication.missing")), None);
        assert_eq!(lookup(&record, &path("publication.name.deeper")), None);
    }

    #[test]
    fn lookup_present_skips_vacant_values() {
        let record = json!({"a": "", "b": [], "c": {}, "d": null, "e": 0});
        for key in ["a", "b", "c", "d"] {
            assert_eq!(lookup_present(&record, &path(key)), None, "{key}");
        }
        assert_eq!(lookup_present(&record, &path("e")), Some(&json!(0)));
    }

    #[test]
    fn assign_creates_maps() {
        let mut doc = json!({});
        assign(&mut doc, &path("licence.name"), json!("CC-BY-4.0"));
        assert_eq!(doc, json!({"licence": {"name": "CC-BY-4.0"}}));
    }

    #[test]
    fn assign_creates_lists_for_numeric_segments() {
        let mut doc = json!({});
        assign(&mut doc, &path("creators.1.name"), json!("B"));
        assign(&mut doc, &path("creators.0.name"), json!("A"));
        assert_eq!(doc, json!({"creators": [{"name": "A"}, {"name": "B"}]}));
    }

    #[test]
    fn assign_pads_lists_with_empty_strings() {
        let mut doc = json!({});
        assign(&mut doc, &path("tags.2"), json!("x"));
        assert_eq!(doc, json!({"tags": ["", "", "x"]}));

        let mut doc = json!({});
        assign(&mut doc, &path("creators.1.name"), json!("B"));
        assert_eq!(doc, json!({"creators": ["", {"name": "B"}]}));
    }

    #[test]
    fn assign_replaces_wrongly_shaped_containers() {
        let mut doc = json!({"software": "plain"});
        assign(&mut doc, &path("software.name"), json!("Underworld"));
        assert_eq!(doc, json!({"software": {"name": "Underworld"}}));
    }

    #[test]
    fn assign_empty_path_replaces_root() {
        let mut doc = json!({"a": 1});
        assign(&mut doc, &FieldPath::default(), json!([1]));
        assert_eq!(doc, json!([1]));
    }
}
