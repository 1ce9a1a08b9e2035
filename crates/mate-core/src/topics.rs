//! Repository topics
//!
//! GitHub topics are lowercase, at most 50 characters, made of letters,
//! digits and hyphens, and start with a letter or digit.

use mate_record::SubmissionRecord;
use serde_json::Value;

/// Longest topic GitHub accepts
pub const MAX_TOPIC_LEN: usize = 50;

/// Reduce free text to a valid topic, or `None` if nothing survives
#[must_use]
pub fn sanitize_topic(raw: &str) -> Option<String> {
    let mut topic = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            topic.push(c);
        } else if !topic.is_empty() && !topic.ends_with('-') {
            topic.push('-');
        }
    }
    topic.truncate(MAX_TOPIC_LEN);
    let topic = topic.trim_end_matches('-').to_string();
    (!topic.is_empty()).then_some(topic)
}

/// Topics for a model repository: categories first, then keywords
#[must_use]
pub fn repository_topics(record: &SubmissionRecord) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for key in ["model_category", "keywords"] {
        let values = record.get(key).and_then(Value::as_array).into_iter().flatten();
        for topic in values.filter_map(Value::as_str).filter_map(sanitize_topic) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn sanitizes_free_text() {
        assert_eq!(sanitize_topic("Mantle Convection").as_deref(), Some("mantle-convection"));
        assert_eq!(sanitize_topic("  (geo)dynamics!! ").as_deref(), Some("geo-dynamics"));
        assert_eq!(sanitize_topic("Über Modell").as_deref(), Some("ber-modell"));
        assert_eq!(sanitize_topic("---"), None);
        assert_eq!(sanitize_topic(&"a".repeat(80)).map(|t| t.len()), Some(MAX_TOPIC_LEN));
    }

    #[test]
    fn categories_then_keywords_without_duplicates() {
        let record = SubmissionRecord::from_value(json!({
            "model_category": ["model published in study", "Mantle convection"],
            "keywords": ["mantle convection", "Plumes", ""]
        }));
        assert_eq!(
            repository_topics(&record),
            vec!["model-published-in-study", "mantle-convection", "plumes"]
        );
    }
}
