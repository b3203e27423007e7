//! Cached proposal access.

use crate::config::{CacheConfig, ProposalConfig};
use crate::models::{IdHash, Proposal};
use crate::services::{ProposalCache, ProposalEngine};

/// Proposal engine fronted by [`ProposalCache`]s.
///
/// Topic-mode and combined lookups are memoized by `(topic, current subjects)`
/// in separate caches, so one mode never serves the other's entry.
/// Concurrent misses for the same key both compute, and the last write wins;
/// proposals are a pure function of their inputs, so either result is valid.
/// Callers should invalidate a topic when new messages change its current
/// subjects.
pub struct ProposalService {
    engine: ProposalEngine,
    topic_cache: ProposalCache,
    combined_cache: ProposalCache,
}

impl ProposalService {
    /// Creates a service whose caches are each sized from `cache_config`.
    #[must_use]
    pub fn new(engine: ProposalEngine, cache_config: &CacheConfig) -> Self {
        Self {
            engine,
            topic_cache: ProposalCache::from_config(cache_config),
            combined_cache: ProposalCache::from_config(cache_config),
        }
    }

    /// Returns the underlying engine for uncached operations.
    #[must_use]
    pub const fn engine(&self) -> &ProposalEngine {
        &self.engine
    }

    /// Returns the cache of topic-mode proposals.
    #[must_use]
    pub const fn topic_cache(&self) -> &ProposalCache {
        &self.topic_cache
    }

    /// Returns the cache of combined proposals.
    #[must_use]
    pub const fn combined_cache(&self) -> &ProposalCache {
        &self.combined_cache
    }

    /// Conversation proposals for a topic's current subjects, served from
    /// cache when fresh.
    pub fn proposals_for_topic(
        &self,
        topic_id: &str,
        current_subject_refs: &[IdHash],
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        if let Some(cached) = self.topic_cache.get(topic_id, current_subject_refs) {
            tracing::debug!(topic = %topic_id, mode = "topic", "Serving proposals from cache");
            return cached;
        }

        let proposals = self
            .engine
            .proposals_for_topic(topic_id, current_subject_refs, config, None);
        self.topic_cache
            .set(topic_id, current_subject_refs, proposals.clone());
        proposals
    }

    /// Combined conversation and memory proposals, served from cache when fresh.
    pub fn combined_proposals(
        &self,
        topic_id: &str,
        current_subject_refs: &[IdHash],
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        if let Some(cached) = self.combined_cache.get(topic_id, current_subject_refs) {
            tracing::debug!(topic = %topic_id, mode = "combined", "Serving proposals from cache");
            return cached;
        }

        let proposals = self
            .engine
            .combined_proposals(topic_id, current_subject_refs, config);
        self.combined_cache
            .set(topic_id, current_subject_refs, proposals.clone());
        proposals
    }

    /// Proposals for typed text. Never cached: input changes per keystroke.
    pub fn proposals_for_input(
        &self,
        topic_id: &str,
        free_text: &str,
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        self.engine.proposals_for_input(topic_id, free_text, config)
    }

    /// Drops cached proposals of both modes for a topic whose conversation
    /// changed, returning how many entries were removed.
    pub fn on_topic_changed(&self, topic_id: &str) -> usize {
        self.topic_cache.invalidate(topic_id) + self.combined_cache.invalidate(topic_id)
    }
}
