//! Issue-form field extraction
//!
//! GitHub issue forms render every question as a `### <label>` heading
//! followed by the answer. [`FieldExtractor`] turns such a body into a flat
//! label → answer mapping.
//!
//! A heading runs to the end of its line; the answer runs from the following
//! line up to the next `###` or the end of input. When a label repeats, the
//! later answer wins.

use indexmap::IndexMap;
use mate_record::NO_RESPONSE;

const HEADING: &str = "###";

/// Answer to one form question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer<'a> {
    /// Heading absent, answer blank, or the "no response" sentinel
    Missing,
    /// Trimmed answer text
    Given(&'a str),
}

impl<'a> Answer<'a> {
    /// Answer text, if given
    #[inline]
    #[must_use]
    pub fn text(self) -> Option<&'a str> {
        match self {
            Self::Given(text) => Some(text),
            Self::Missing => None,
        }
    }

    /// Check if unanswered
    #[inline]
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Extracted label → raw answer mapping, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    fields: IndexMap<String, String>,
}

impl IssueFields {
    /// Raw answer text as written in the issue
    #[must_use]
    pub fn raw(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    /// Answer with the sentinel and blanks folded into [`Answer::Missing`]
    #[must_use]
    pub fn answer(&self, label: &str) -> Answer<'_> {
        match self.raw(label).map(str::trim) {
            Some(text) if !text.is_empty() && text != NO_RESPONSE => Answer::Given(text),
            _ => Answer::Missing,
        }
    }

    /// Labels in document order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Raw answers as a JSON object, for the metadata trail
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        self.fields
            .iter()
            .map(|(label, answer)| (label.clone(), serde_json::Value::String(answer.clone())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    /// Number of distinct labels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no heading was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Heading-delimited text parser
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    /// Create new extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Split an issue body into label → answer pairs
    #[must_use]
    pub fn extract(&self, text: &str) -> IssueFields {
        let mut fields = IndexMap::new();
        let mut cursor = 0;

        while let Some(found) = text[cursor..].find(HEADING) {
            let label_start = cursor + found + HEADING.len();
            let rest = &text[label_start..];

            // A heading without a line break carries no answer
            let Some(line_end) = rest.find(['\r', '\n']) else {
                break;
            };
            let label = rest[..line_end].trim();

            let body_start = label_start + line_end;
            let body = text[body_start..].trim_start_matches(['\r', '\n']);
            let body_offset = text.len() - body.len();
            let body_end = body.find(HEADING).map_or(text.len(), |i| body_offset + i);

            // Repeated label: keeps its first position, takes the later answer
            fields.insert(label.to_string(), text[body_offset..body_end].to_string());
            cursor = body_end;
        }

        IssueFields { fields }
    }
}

/// Convenience wrapper around [`FieldExtractor::extract`]
#[must_use]
pub fn extract(text: &str) -> IssueFields {
    FieldExtractor::new().extract(text)
}
