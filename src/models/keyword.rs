//! Keyword records.

use super::IdHash;
use serde::{Deserialize, Serialize};

/// A normalized term tracked across conversations.
///
/// The normalized `term` is the identity of a keyword: two records with the
/// same term collapse to the same id hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    /// Lowercased, trimmed term.
    pub term: String,
    /// Number of times the term was seen.
    #[serde(default)]
    pub frequency: u32,
    /// Subjects this keyword appears in.
    #[serde(default)]
    pub subjects: Vec<IdHash>,
    /// Extraction score.
    #[serde(default)]
    pub score: f64,
    /// Creation timestamp (Unix epoch milliseconds).
    #[serde(default)]
    pub created_at: i64,
    /// Last time the term was seen (Unix epoch milliseconds).
    #[serde(default)]
    pub last_seen: i64,
}

impl Keyword {
    /// Creates a keyword with a normalized term and zeroed counters.
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self {
            term: normalize_term(term),
            frequency: 0,
            subjects: Vec::new(),
            score: 0.0,
            created_at: 0,
            last_seen: 0,
        }
    }
}

/// Normalizes a keyword term: trimmed and lowercased.
#[must_use]
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Database "), "database");
        assert_eq!(normalize_term("SCHEMA"), "schema");
        assert_eq!(normalize_term(""), "");
    }

    #[test]
    fn test_new_normalizes() {
        let kw = Keyword::new(" Migration");
        assert_eq!(kw.term, "migration");
        assert_eq!(kw.frequency, 0);
    }
}
