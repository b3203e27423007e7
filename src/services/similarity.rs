//! Keyword-set similarity and recency scoring.
//!
//! Pure functions shared by the proposal engine and the ranker. Term inputs
//! are expected to be normalized already (see [`crate::models::normalize_term`]);
//! duplicates within one input are ignored.

use crate::config::ProposalConfig;
use std::collections::HashSet;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` of two term sets.
///
/// Returns `0.0` when either set is empty, so that "no information" never
/// reads as a perfect match.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard<A: AsRef<str>, B: AsRef<str>>(terms_a: &[A], terms_b: &[B]) -> f64 {
    let set_a: HashSet<&str> = terms_a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = terms_b.iter().map(AsRef::as_ref).collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f64 / union as f64
}

/// Terms present in both sets, in first-occurrence order of `terms_a`.
#[must_use]
pub fn matched_terms<A: AsRef<str>, B: AsRef<str>>(terms_a: &[A], terms_b: &[B]) -> Vec<String> {
    let set_b: HashSet<&str> = terms_b.iter().map(AsRef::as_ref).collect();
    let mut seen = HashSet::new();
    terms_a
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| set_b.contains(t) && seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Linear recency decay: `1` at age zero, `0` at or beyond the window.
///
/// Timestamps in the future (clock skew) are capped at `1`. A non-positive
/// window yields `0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn recency_boost(created_at: i64, now: i64, recency_window_ms: i64) -> f64 {
    if recency_window_ms <= 0 {
        return 0.0;
    }
    let age = now.saturating_sub(created_at) as f64;
    (1.0 - age / recency_window_ms as f64).clamp(0.0, 1.0)
}

/// Combined relevance: `jaccard * match_weight + recency * recency_weight`.
#[must_use]
pub fn relevance(jaccard: f64, recency_boost: f64, config: &ProposalConfig) -> f64 {
    jaccard.mul_add(
        config.match_weight,
        recency_boost * config.recency_weight,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let current = terms(&["database", "migration"]);
        let past = terms(&["database", "schema"]);
        assert!((jaccard(&current, &past) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test_case(&[], &["a"] ; "left empty")]
    #[test_case(&["a"], &[] ; "right empty")]
    #[test_case(&[], &[] ; "both empty")]
    #[test_case(&["a", "b"], &["c"] ; "disjoint")]
    fn test_jaccard_zero(a: &[&str], b: &[&str]) {
        assert!(jaccard(a, b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_identical_is_one() {
        let a = terms(&["rust", "async", "tokio"]);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_ignores_duplicates() {
        let a = terms(&["rust", "rust", "async"]);
        let b = terms(&["rust", "async"]);
        assert!((jaccard(&a, &b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matched_terms_order_and_dedup() {
        let a = terms(&["schema", "database", "schema", "index"]);
        let b = terms(&["database", "schema"]);
        assert_eq!(matched_terms(&a, &b), vec!["schema", "database"]);
        assert!(matched_terms(&a, &terms(&["other"])).is_empty());
    }

    #[test_case(0, 1.0 ; "age zero")]
    #[test_case(15 * DAY_MS, 0.5 ; "half window")]
    #[test_case(30 * DAY_MS, 0.0 ; "at window edge")]
    #[test_case(90 * DAY_MS, 0.0 ; "beyond window")]
    #[test_case(-5 * DAY_MS, 1.0 ; "future timestamp")]
    fn test_recency_boost(age_ms: i64, expected: f64) {
        let now = 1_700_000_000_000;
        let boost = recency_boost(now - age_ms, now, 30 * DAY_MS);
        assert!((boost - expected).abs() < 1e-9, "age {age_ms}: {boost}");
    }

    #[test]
    fn test_recency_boost_non_positive_window() {
        assert!(recency_boost(0, 0, 0).abs() < f64::EPSILON);
        assert!(recency_boost(0, 0, -1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_relevance_weights() {
        let config = ProposalConfig::default().with_weights(0.7, 0.3);
        assert!((relevance(1.0, 1.0, &config) - 1.0).abs() < 1e-12);
        assert!((relevance(0.5, 0.0, &config) - 0.35).abs() < 1e-12);
        assert!((relevance(0.0, 0.5, &config) - 0.15).abs() < 1e-12);
    }
}
