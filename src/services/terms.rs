//! Term extraction for free text and memory records.

use crate::models::{MemoryRecord, normalize_term};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Minimum trimmed length of free text before it is tokenized.
pub const MIN_INPUT_CHARS: usize = 3;
/// Minimum length of a token kept from free text or a memory name.
pub const MIN_TERM_CHARS: usize = 3;

/// Runs of non-word characters.
#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Separators used in memory names: `+`, `-`, `_`, whitespace.
#[allow(clippy::expect_used)] // Literal pattern, checked by tests
static NAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+\-_\s]+").expect("valid regex"));

/// English words that carry no topical signal.
static STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
    "about", "through", "during", "before", "after", "above", "below", "between", "under",
    "again", "then", "once", "here", "there", "when", "where", "why", "how", "all", "each",
    "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same",
    "so", "than", "too", "very", "just", "also", "now", "and", "but", "or", "if", "because",
    "until", "while", "this", "that", "these", "those", "what", "which", "who", "whom", "whose",
    "it", "its", "they", "them", "their", "we", "us", "our", "you", "your", "i", "my", "me",
    "he", "him", "his", "she", "her", "get", "got", "let", "like", "want", "know", "think",
];

/// Tokenizes text the user is currently typing into query terms.
///
/// Lowercases, splits on non-word runs, and drops tokens shorter than
/// [`MIN_TERM_CHARS`], stop words, and pure numbers. Returns deduplicated
/// terms in first-occurrence order; empty if the trimmed text is shorter
/// than [`MIN_INPUT_CHARS`].
#[must_use]
pub fn tokenize_input(text: &str) -> Vec<String> {
    if text.trim().chars().count() < MIN_INPUT_CHARS {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    NON_WORD
        .split(&lowered)
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .filter(|t| !STOP_WORDS.contains(t))
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Extracts the keyword terms of a memory record.
///
/// Explicit `metadata.keywords` win over `metadata.tags`; either may be a
/// comma-separated string or an array of strings. Without either, the name
/// is split on separators and tokens of at least [`MIN_TERM_CHARS`] are kept.
#[must_use]
pub fn memory_keywords(memory: &MemoryRecord) -> Vec<String> {
    let explicit = ["keywords", "tags"]
        .iter()
        .filter_map(|key| memory.metadata.get(*key))
        .map(metadata_terms)
        .find(|terms| !terms.is_empty());

    let terms = explicit.unwrap_or_else(|| {
        NAME_SEPARATORS
            .split(&memory.name)
            .map(normalize_term)
            .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
            .collect()
    });

    dedup(terms)
}

/// Reads a metadata value as a list of normalized terms.
fn metadata_terms(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) => s
            .split(',')
            .map(normalize_term)
            .filter(|t| !t.is_empty())
            .collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(normalize_term)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn dedup(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdHash;
    use serde_json::json;
    use std::collections::HashMap;
    use test_case::test_case;

    fn memory(name: &str, metadata: HashMap<String, serde_json::Value>) -> MemoryRecord {
        MemoryRecord {
            id: IdHash::new("m1"),
            name: name.to_string(),
            description: None,
            metadata,
            created: 0,
        }
    }

    #[test_case("" ; "empty")]
    #[test_case("hi" ; "two chars")]
    #[test_case("  a  " ; "padded single char")]
    fn test_short_input_rejected(text: &str) {
        assert!(tokenize_input(text).is_empty());
    }

    #[test]
    fn test_tokenize_input() {
        let tokens = tokenize_input("How do we migrate the Database schema? Database again, 2024");
        assert_eq!(tokens, vec!["migrate", "database", "schema"]);
    }

    #[test]
    fn test_tokenize_only_stop_words() {
        assert!(tokenize_input("what about this and that").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_alphanumeric_mixed() {
        assert_eq!(tokenize_input("upgrade to http2 now"), vec!["upgrade", "http2"]);
    }

    #[test]
    fn test_memory_keywords_from_comma_string() {
        let meta = HashMap::from([("keywords".to_string(), json!("Postgres, tuning ,, index"))]);
        assert_eq!(
            memory_keywords(&memory("ignored", meta)),
            vec!["postgres", "tuning", "index"]
        );
    }

    #[test]
    fn test_memory_keywords_from_tag_array() {
        let meta = HashMap::from([("tags".to_string(), json!(["Rust", "async", 7, "rust"]))]);
        assert_eq!(memory_keywords(&memory("ignored", meta)), vec!["rust", "async"]);
    }

    #[test]
    fn test_memory_keywords_prefers_keywords_over_tags() {
        let meta = HashMap::from([
            ("keywords".to_string(), json!("database")),
            ("tags".to_string(), json!("schema")),
        ]);
        assert_eq!(memory_keywords(&memory("ignored", meta)), vec!["database"]);
    }

    #[test]
    fn test_memory_keywords_from_name() {
        let m = memory("Postgres-tuning_for + db  indexes", HashMap::new());
        assert_eq!(memory_keywords(&m), vec!["postgres", "tuning", "for", "indexes"]);
    }

    #[test]
    fn test_memory_keywords_empty_metadata_falls_back_to_name() {
        let meta = HashMap::from([("keywords".to_string(), json!(""))]);
        assert_eq!(memory_keywords(&memory("schema-notes", meta)), vec!["schema", "notes"]);
    }
}
