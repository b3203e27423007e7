//! Stored memory records.

use super::IdHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of characters carried in a memory proposal's content preview.
pub const MEMORY_CONTENT_PREVIEW_CHARS: usize = 200;

/// A standalone stored knowledge item, not tied to a conversation.
///
/// `metadata` may carry `keywords` or `tags`, either as a comma-separated
/// string or as an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Identifier (id hash in the memory store).
    pub id: IdHash,
    /// Display name.
    pub name: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Creation timestamp (Unix epoch milliseconds).
    pub created: i64,
}

impl MemoryRecord {
    /// Returns a preview of the memory content for display.
    ///
    /// Uses the description when present and non-blank, otherwise the name,
    /// truncated to [`MEMORY_CONTENT_PREVIEW_CHARS`] characters.
    #[must_use]
    pub fn content_preview(&self) -> String {
        let source = self
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.name);
        source.chars().take(MEMORY_CONTENT_PREVIEW_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, description: Option<&str>) -> MemoryRecord {
        MemoryRecord {
            id: IdHash::new("mem-1"),
            name: name.to_string(),
            description: description.map(str::to_string),
            metadata: HashMap::new(),
            created: 0,
        }
    }

    #[test]
    fn test_preview_prefers_description() {
        let m = record("db-notes", Some("Notes on the schema migration"));
        assert_eq!(m.content_preview(), "Notes on the schema migration");
    }

    #[test]
    fn test_preview_falls_back_to_name() {
        assert_eq!(record("db-notes", None).content_preview(), "db-notes");
        assert_eq!(record("db-notes", Some("   ")).content_preview(), "db-notes");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        let m = record("x", Some(&long));
        let preview = m.content_preview();
        assert_eq!(preview.chars().count(), MEMORY_CONTENT_PREVIEW_CHARS);
    }
}
