//! Cumulative, human-facing error log
//!
//! The log is posted back to the submitter as an issue comment, so entries are
//! grouped under a bold section heading per form field and rendered as
//! markdown. It is separate from `tracing` output.

use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// How serious a log entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, e.g. a registry lookup detail
    Note,
    /// Degraded but usable
    Warning,
    /// Field dropped or emptied
    Error,
}

impl Severity {
    fn prefix(self) -> &'static str {
        match self {
            Self::Note => "",
            Self::Warning => "Warning: ",
            Self::Error => "Error: ",
        }
    }
}

/// One log line attached to a form section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Form section heading
    pub section: String,
    /// Seriousness
    pub severity: Severity,
    /// Text shown to the submitter
    pub message: String,
}

/// Ordered list of log entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    entries: Vec<LogEntry>,
}

impl ErrorLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, section: impl Into<String>, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            section: section.into(),
            severity,
            message: message.into(),
        });
    }

    /// Append a warning
    pub fn warn(&mut self, section: impl Into<String>, message: impl Into<String>) {
        self.push(section, Severity::Warning, message);
    }

    /// Append an error
    pub fn error(&mut self, section: impl Into<String>, message: impl Into<String>) {
        self.push(section, Severity::Error, message);
    }

    /// Append free text returned by a collaborator
    ///
    /// Each non-blank line becomes a [`Severity::Note`] unless it already
    /// starts with a `Warning:` or `Error:` prefix.
    pub fn push_text(&mut self, section: &str, text: &str) {
        for line in text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            let trimmed = line.trim_start().trim_start_matches("- ");
            let (severity, message) = if let Some(rest) = trimmed.strip_prefix("Error:") {
                (Severity::Error, rest.trim())
            } else if let Some(rest) = trimmed.strip_prefix("Warning:") {
                (Severity::Warning, rest.trim())
            } else {
                (Severity::Note, line)
            };
            self.push(section, severity, message);
        }
    }

    /// Append a field error with its own severity
    pub fn record(&mut self, section: &str, error: &FieldError) {
        self.push(section, error.severity(), error.message());
    }

    /// Append every entry of another log
    pub fn extend(&mut self, other: ErrorLog) {
        self.entries.extend(other.entries);
    }

    /// All entries in insertion order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries at the given severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Check if log has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one section
    pub fn section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a LogEntry> {
        self.entries.iter().filter(move |e| e.section == section)
    }

    /// Render as markdown
    ///
    /// Consecutive entries of the same section share one heading.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for ErrorLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut current: Option<&str> = None;
        for entry in &self.entries {
            if current != Some(entry.section.as_str()) {
                writeln!(f, "**{}**", entry.section)?;
                current = Some(entry.section.as_str());
            }
            writeln!(f, "{}{} ", entry.severity.prefix(), entry.message)?;
        }
        Ok(())
    }
}
