//! Proposal ranking.

use crate::config::ProposalConfig;
use crate::models::Proposal;
use crate::services::similarity;

/// Sorts and truncates proposal lists.
///
/// Also exposes the scoring functions so callers outside the engine can
/// score with the same formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalRanker;

#[allow(clippy::unused_self)]
impl ProposalRanker {
    /// Creates a new ranker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Sorts by relevance descending and keeps at most `config.max_proposals`.
    ///
    /// The sort is stable: proposals with equal scores keep their input order.
    #[must_use]
    pub fn rank(&self, proposals: Vec<Proposal>, config: &ProposalConfig) -> Vec<Proposal> {
        rank_with_limit(proposals, config.max_proposals)
    }

    /// Combined relevance score. See [`similarity::relevance`].
    #[must_use]
    pub fn relevance(&self, jaccard: f64, recency: f64, config: &ProposalConfig) -> f64 {
        similarity::relevance(jaccard, recency, config)
    }

    /// Recency boost relative to the current time. See [`similarity::recency_boost`].
    #[must_use]
    pub fn recency_boost(&self, created_at: i64, recency_window_ms: i64) -> f64 {
        similarity::recency_boost(created_at, crate::current_timestamp_ms(), recency_window_ms)
    }
}

/// Stable descending sort by relevance, truncated to `limit`.
pub(crate) fn rank_with_limit(mut proposals: Vec<Proposal>, limit: usize) -> Vec<Proposal> {
    proposals.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    proposals.truncate(limit);
    proposals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdHash, ProposalType};

    fn proposal(id: &str, score: f64) -> Proposal {
        Proposal {
            id: id.to_string(),
            past_subject: IdHash::new(id),
            current_subject: IdHash::new("current"),
            matched_keywords: Vec::new(),
            relevance_score: score,
            source_topic_id: "chat-2".to_string(),
            past_subject_name: id.to_string(),
            past_subject_description: None,
            created_at: 0,
            proposal_type: ProposalType::Conversation,
            memory_id_hash: None,
            memory_content: None,
        }
    }

    fn ids(proposals: &[Proposal]) -> Vec<&str> {
        proposals.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let ranker = ProposalRanker::new();
        let config = ProposalConfig::default().with_max_proposals(3);
        let ranked = ranker.rank(
            vec![
                proposal("a", 0.1),
                proposal("b", 0.9),
                proposal("c", 0.5),
                proposal("d", 0.7),
            ],
            &config,
        );
        assert_eq!(ids(&ranked), vec!["b", "d", "c"]);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let ranker = ProposalRanker::new();
        let config = ProposalConfig::default();
        let ranked = ranker.rank(
            vec![proposal("x", 0.5), proposal("y", 0.5), proposal("z", 0.6)],
            &config,
        );
        assert_eq!(ids(&ranked), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_rank_zero_limit() {
        let config = ProposalConfig::default().with_max_proposals(0);
        assert!(ProposalRanker::new().rank(vec![proposal("a", 1.0)], &config).is_empty());
    }

    #[test]
    fn test_recency_boost_now() {
        let ranker = ProposalRanker::new();
        let boost = ranker.recency_boost(crate::current_timestamp_ms(), 60_000);
        assert!(boost > 0.99);
        assert!(ranker.recency_boost(0, 60_000).abs() < f64::EPSILON);
    }
}
