//! Dotted field paths
//!
//! Provides [`FieldPath`] for addressing values inside a submission record or a
//! target document. Segments are separated by `.`; a segment made only of
//! digits indexes a sequence and a lone `#` is a list wildcard that is expanded
//! before the path is used.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One segment of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
    /// List wildcard (`#`), replaced by a concrete index during expansion
    Wildcard,
}

impl Segment {
    /// Whether this segment addresses a sequence element
    #[inline]
    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }

    /// Key text, if this is a key segment
    #[inline]
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
            Self::Wildcard => f.write_str("#"),
        }
    }
}

impl From<&str> for Segment {
    fn from(raw: &str) -> Self {
        if raw == "#" {
            Self::Wildcard
        } else if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Digit strings too long for usize stay keys.
            raw.parse().map_or_else(|_| Self::Key(raw.to_string()), Self::Index)
        } else {
            Self::Key(raw.to_string())
        }
    }
}

/// Dotted path into a nested record
///
/// # Examples
/// - `publication.name` → key `publication`, key `name`
/// - `creators.0.@id` → key, index 0, key
/// - `creators.#.familyName` → key, wildcard, key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Path with a single key segment
    #[inline]
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![Segment::Key(key.into())])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Prefix made of the first `len` segments
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Position of the first wildcard segment
    #[inline]
    #[must_use]
    pub fn first_wildcard(&self) -> Option<usize> {
        self.0.iter().position(|s| matches!(s, Segment::Wildcard))
    }

    /// Whether the path contains a wildcard
    #[inline]
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.first_wildcard().is_some()
    }

    /// Replace the first wildcard with `index`
    ///
    /// Returns the path unchanged when it has no wildcard.
    #[must_use]
    pub fn fill_wildcard(&self, index: usize) -> Self {
        let mut new = self.clone();
        if let Some(pos) = new.first_wildcard() {
            new.0[pos] = Segment::Index(index);
        }
        new
    }

    /// Insert an index segment so that it follows the segment at `after`
    ///
    /// `after` is clamped so the index never becomes the final segment of a
    /// path that has more than one segment.
    #[must_use]
    pub fn insert_index_after(&self, after: usize, index: usize) -> Self {
        let mut new = self.clone();
        let at = if new.0.len() > 1 {
            (after + 1).min(new.0.len() - 1)
        } else {
            new.0.len()
        };
        new.0.insert(at, Segment::Index(index));
        new
    }

    /// Iterator over segments
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(Segment::from(seg))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<String> for Segment {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

/// Errors related to field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path text was empty
    #[error("field path is empty")]
    Empty,

    /// Empty segment in path
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),
}
