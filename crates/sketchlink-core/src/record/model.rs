//! Record domain models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used when a record carries no diagram name.
pub const DEFAULT_DOCUMENT_NAME: &str = "diagram.drawio";

/// Opaque identifier of the record a session edits.
///
/// The bridge never interprets the value; it is handed back to the record
/// accessor unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is usable as a file stem.
    ///
    /// Only ASCII alphanumerics, `-`, `_` and `.` are accepted, and the id
    /// must not start with `.`.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && !self.0.starts_with('.')
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// The stored diagram of a record, as returned by a read.
///
/// Both fields are optional: a record that never had a diagram has neither.
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRecord {
    /// Serialized diagram document (XML text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Display name of the diagram
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DiagramRecord {
    /// Creates a record with the given document and name.
    pub fn new(document: Option<String>, name: Option<String>) -> Self {
        Self { document, name }
    }

    /// Returns the stored document, or `None` when absent or empty.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref().filter(|doc| !doc.is_empty())
    }

    /// Returns the display name, falling back to `default_name`.
    pub fn name_or<'a>(&'a self, default_name: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(default_name)
    }
}
