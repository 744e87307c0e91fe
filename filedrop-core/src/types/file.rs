//! File entries stored in the registry.

use serde::{Deserialize, Serialize};

use crate::error::{FiledropError, Result};

/// A file known to the registry.
///
/// Names are unique within a registry; the identifier is an opaque token
/// handed out by the chat platform and used to re-send the document.
///
/// # Log Format
/// ```text
/// <id> <name>\n
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    /// Opaque file identifier
    pub id: String,
    /// File name (registry key)
    pub name: String,
}

impl FileEntry {
    /// Creates a new entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Checks that the entry survives a round trip through the log.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(FiledropError::InvalidEntry("file id is empty".into()));
        }
        if self.id.chars().any(char::is_whitespace) {
            return Err(FiledropError::InvalidEntry(
                "file id must not contain whitespace".into(),
            ));
        }
        if self.name.trim_end().is_empty() {
            return Err(FiledropError::InvalidEntry("file name is empty".into()));
        }
        if self.name.trim_end() != self.name {
            return Err(FiledropError::InvalidEntry(
                "file name must not end with whitespace".into(),
            ));
        }
        if self.name.contains(['\n', '\r']) {
            return Err(FiledropError::InvalidEntry(
                "file name must not contain line breaks".into(),
            ));
        }
        Ok(())
    }

    /// Formats the entry as a log record (without the trailing newline).
    pub fn to_log_line(&self) -> String {
        format!("{} {}", self.id, self.name)
    }

    /// Parses a log record.
    ///
    /// Trailing whitespace is dropped and the line is split on the first
    /// space. Returns `None` for blank lines and lines without a separator.
    pub fn from_log_line(line: &str) -> Option<Self> {
        let line = line.trim_end();
        let (id, name) = line.split_once(' ')?;
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(id, name))
    }
}

/// Registry statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Number of distinct file names
    pub total_files: u64,
    /// Number of records read from or appended to the log
    pub log_records: u64,
    /// Log records that were skipped as malformed on load
    pub malformed_records: u64,
}
