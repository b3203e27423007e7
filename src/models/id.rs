//! Content-addressed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an object in a content-addressed store.
///
/// An id hash is a value, not a pointer: the object it names may or may not
/// still be resident in the store, and must be resolved before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdHash(String);

impl IdHash {
    /// Creates a new id hash.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IdHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for IdHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_hash_display() {
        let id = IdHash::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_id_hash_serializes_transparently() {
        let id = IdHash::from("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");

        let back: IdHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
