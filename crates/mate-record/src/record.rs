//! Submission record
//!
//! Built field by field through [`RecordBuilder`], then frozen into an
//! immutable [`SubmissionRecord`] that the graph builder and the projection
//! engine both read.

use crate::access::{self, is_vacant};
use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registry metadata, before or after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    /// Already a JSON-LD entity (`@type` and `@id` present)
    Normalized(Map<String, Value>),
    /// Registry-native JSON awaiting normalization
    Raw(Value),
}

impl Metadata {
    /// Decide whether a registry response is already a JSON-LD entity
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("@type") && map.contains_key("@id") => Self::Normalized(map),
            other => Self::Raw(other),
        }
    }

    /// Check if nothing usable came back
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Normalized(map) => map.is_empty(),
            Self::Raw(value) => is_vacant(value),
        }
    }
}

/// Mutable record under construction
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    fields: Map<String, Value>,
}

impl RecordBuilder {
    /// Create empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level field
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Set a serializable value
    ///
    /// Values that fail to serialize are stored as `null`.
    pub fn set_serialized<T: Serialize>(&mut self, field: impl Into<String>, value: &T) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.set(field, value)
    }

    /// Read back an earlier field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Read back a nested value of an earlier field
    #[must_use]
    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.iter();
        let first = segments.next()?.as_key()?;
        let rest = FieldPath::new(segments.cloned().collect());
        access::lookup_present(self.fields.get(first)?, &rest)
    }

    /// Mutable access to an earlier field
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    /// Freeze into an immutable record
    #[must_use]
    pub fn build(self) -> SubmissionRecord {
        SubmissionRecord {
            root: Value::Object(self.fields),
        }
    }
}

/// Immutable submission record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionRecord {
    root: Value,
}

impl SubmissionRecord {
    /// Wrap an existing JSON object
    ///
    /// Non-object values become an empty record.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let root = if value.is_object() { value } else { Value::Object(Map::new()) };
        Self { root }
    }

    /// Top-level field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    /// Top-level string field
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Nested value by dotted path
    #[must_use]
    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        access::lookup(&self.root, path)
    }

    /// Whole record as JSON
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Pretty JSON text
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_needs_type_and_id() {
        assert!(matches!(
            Metadata::classify(json!({"@type": "Person", "@id": "x"})),
            Metadata::Normalized(_)
        ));
        assert!(matches!(Metadata::classify(json!({"@id": "x"})), Metadata::Raw(_)));
        assert!(matches!(Metadata::classify(json!({"@type": "Person"})), Metadata::Raw(_)));
        assert!(Metadata::classify(json!({})).is_empty());
    }

    #[test]
    fn builder_reads_back_earlier_fields() {
        let mut builder = RecordBuilder::new();
        builder.set("publication", json!({"name": "Basalt", "abstract": ""}));

        let name: FieldPath = "publication.name".parse().unwrap();
        let abstract_: FieldPath = "publication.abstract".parse().unwrap();
        assert_eq!(builder.lookup(&name), Some(&json!("Basalt")));
        assert_eq!(builder.lookup(&abstract_), None);
    }

    #[test]
    fn built_record_is_an_object() {
        let mut builder = RecordBuilder::new();
        builder.set("slug", "smith-2024-basalt");
        let record = builder.build();

        assert_eq!(record.get_str("slug"), Some("smith-2024-basalt"));
        assert_eq!(record.as_value(), &json!({"slug": "smith-2024-basalt"}));
        assert_eq!(SubmissionRecord::from_value(json!([1])).as_value(), &json!({}));
    }
}
