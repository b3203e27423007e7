//! Proposal generation.
//!
//! Matches the current conversation context against past subjects from other
//! topics and against stored memories.
//!
//! # Modes
//!
//! | Operation | Query | Candidates | Ranked |
//! |-----------|-------|------------|--------|
//! | [`proposals_for_topic`](ProposalEngine::proposals_for_topic) | current subjects | past subjects | no |
//! | [`proposals_for_input`](ProposalEngine::proposals_for_input) | typed text | past subjects | `max_proposals` |
//! | [`memory_proposals`](ProposalEngine::memory_proposals) | keyword terms | memories | `max_proposals / 2` |
//! | [`combined_proposals`](ProposalEngine::combined_proposals) | current subjects | both | `max_proposals` |
//!
//! Every operation returns a possibly-empty list. Missing objects are
//! skipped quietly, store failures are logged and skipped, and a failure to
//! enumerate topics yields no candidates at all.
//!
//! Scoring runs sequentially over every (query, candidate) pair; store load
//! grows with `current subjects × candidates`.

use crate::config::ProposalConfig;
use crate::models::{IdHash, MemoryRecord, Proposal, ProposalType, Subject};
use crate::services::keyword_resolver::KeywordResolver;
use crate::services::ranker::rank_with_limit;
use crate::services::similarity::{jaccard, matched_terms, recency_boost, relevance};
use crate::services::terms::{memory_keywords, tokenize_input};
use crate::storage::{MemoryStore, ObjectStore, SubjectEnumerator, TopicEnumerator};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Reserved topic under which memory-derived subjects are filed.
///
/// Always enumerated, even when no such topic has been registered yet.
pub const MEMORY_TOPIC_ID: &str = "memories";

/// A current subject with its id hash and keyword terms resolved.
struct CurrentSubject {
    id_hash: IdHash,
    terms: Vec<String>,
}

/// A candidate past subject with lazily resolved keyword terms.
struct Candidate<'a> {
    subject: &'a Subject,
    terms: Option<Vec<String>>,
}

/// Generates proposals from injected stores.
///
/// The engine holds no tuning of its own: every call receives a
/// [`ProposalConfig`].
pub struct ProposalEngine {
    store: Arc<dyn ObjectStore>,
    topics: Arc<dyn TopicEnumerator>,
    subjects: Arc<dyn SubjectEnumerator>,
    memories: Option<Arc<dyn MemoryStore>>,
    resolver: KeywordResolver,
    clock: fn() -> i64,
}

impl ProposalEngine {
    /// Creates an engine without a memory store.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        topics: Arc<dyn TopicEnumerator>,
        subjects: Arc<dyn SubjectEnumerator>,
    ) -> Self {
        Self {
            resolver: KeywordResolver::new(Arc::clone(&store)),
            store,
            topics,
            subjects,
            memories: None,
            clock: crate::current_timestamp_ms,
        }
    }

    /// Adds a memory store as a second knowledge source.
    #[must_use]
    pub fn with_memory_store(mut self, memories: Arc<dyn MemoryStore>) -> Self {
        self.memories = Some(memories);
        self
    }

    /// Replaces the clock used for recency and proposal timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Proposes past subjects from other topics for the current subjects.
    ///
    /// When `past_subjects` is given it is used as the candidate pool instead
    /// of enumerating every topic. Either way, subjects of `topic_id` itself
    /// are never proposed. The result is not sorted or truncated.
    #[instrument(
        skip(self, current_subject_refs, config, past_subjects),
        fields(operation = "proposals_for_topic", topic = %topic_id, current = current_subject_refs.len())
    )]
    pub fn proposals_for_topic(
        &self,
        topic_id: &str,
        current_subject_refs: &[IdHash],
        config: &ProposalConfig,
        past_subjects: Option<&[Subject]>,
    ) -> Vec<Proposal> {
        let current = self.resolve_current_subjects(current_subject_refs);
        if current.is_empty() {
            tracing::debug!("No current subjects resolved");
            return Vec::new();
        }

        let pool = match past_subjects {
            Some(subjects) => subjects
                .iter()
                .filter(|s| s.topic != topic_id)
                .cloned()
                .collect(),
            None => self.fetch_candidate_pool(topic_id),
        };

        let proposals = self.pair_proposals(&current, &pool, config);
        metrics::counter!("proposals_generated_total", "mode" => "topic")
            .increment(proposals.len() as u64);
        proposals
    }

    /// Proposes past subjects matching text the user is typing.
    ///
    /// The typed text is the query, so both `past_subject` and
    /// `current_subject` carry the past subject's id hash. Ranked and
    /// truncated to `config.max_proposals`.
    #[instrument(
        skip(self, free_text, config),
        fields(operation = "proposals_for_input", topic = %topic_id, input_length = free_text.len())
    )]
    pub fn proposals_for_input(
        &self,
        topic_id: &str,
        free_text: &str,
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        let tokens = tokenize_input(free_text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let now = (self.clock)();
        let mut proposals = Vec::new();
        for past in &self.fetch_candidate_pool(topic_id) {
            let past_terms = self.resolver.resolve_terms(&past.keywords);
            let similarity = jaccard(&tokens, &past_terms);
            if !passes_threshold(similarity, config) {
                continue;
            }
            let Some(past_hash) = self.id_hash_of(past) else {
                continue;
            };

            let recency = recency_boost(past.recency_timestamp(), now, config.recency_window_ms);
            proposals.push(Proposal {
                id: format!("input:{past_hash}"),
                current_subject: past_hash.clone(),
                past_subject: past_hash,
                matched_keywords: matched_terms(&tokens, &past_terms),
                relevance_score: relevance(similarity, recency, config),
                source_topic_id: past.topic.clone(),
                past_subject_name: past.id.clone(),
                past_subject_description: past.description.clone(),
                created_at: now,
                proposal_type: ProposalType::Conversation,
                memory_id_hash: None,
                memory_content: None,
            });
        }

        let ranked = rank_with_limit(proposals, config.max_proposals);
        metrics::counter!("proposals_generated_total", "mode" => "input")
            .increment(ranked.len() as u64);
        ranked
    }

    /// Proposes stored memories matching the given keyword terms.
    ///
    /// Ranked and truncated to half of `config.max_proposals`, leaving room
    /// for conversation matches when both are merged.
    #[instrument(
        skip(self, current_keyword_terms, config),
        fields(operation = "memory_proposals", terms = current_keyword_terms.len())
    )]
    pub fn memory_proposals(
        &self,
        current_keyword_terms: &[String],
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        let Some(memories) = &self.memories else {
            tracing::debug!("No memory store configured");
            return Vec::new();
        };
        let ids = match memories.list_memory_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list memories");
                return Vec::new();
            },
        };

        let now = (self.clock)();
        let mut proposals = Vec::new();
        for id in &ids {
            let memory = match memories.get_memory(id) {
                Ok(Some(memory)) => memory,
                Ok(None) => {
                    tracing::debug!(memory = %id, "Memory not found, skipping");
                    continue;
                },
                Err(e) => {
                    tracing::warn!(memory = %id, error = %e, "Failed to fetch memory, skipping");
                    continue;
                },
            };

            if let Some(proposal) = memory_proposal(&memory, current_keyword_terms, config, now) {
                proposals.push(proposal);
            }
        }

        let ranked = rank_with_limit(proposals, config.max_proposals / 2);
        metrics::counter!("proposals_generated_total", "mode" => "memory")
            .increment(ranked.len() as u64);
        ranked
    }

    /// Proposes past subjects and memories for the current subjects, merged.
    ///
    /// Memories are matched against the union of all current subjects'
    /// keyword terms. The merged list is ranked and truncated to
    /// `config.max_proposals`.
    #[instrument(
        skip(self, current_subject_refs, config),
        fields(operation = "combined_proposals", topic = %topic_id, current = current_subject_refs.len())
    )]
    pub fn combined_proposals(
        &self,
        topic_id: &str,
        current_subject_refs: &[IdHash],
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        let current = self.resolve_current_subjects(current_subject_refs);
        if current.is_empty() {
            tracing::debug!("No current subjects resolved");
            return Vec::new();
        }

        let pool = self.fetch_candidate_pool(topic_id);
        let mut proposals = self.pair_proposals(&current, &pool, config);

        let mut seen = HashSet::new();
        let term_union: Vec<String> = current
            .iter()
            .flat_map(|c| c.terms.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();
        proposals.extend(self.memory_proposals(&term_union, config));

        let ranked = rank_with_limit(proposals, config.max_proposals);
        metrics::counter!("proposals_generated_total", "mode" => "combined")
            .increment(ranked.len() as u64);
        tracing::info!(count = ranked.len(), "Generated combined proposals");
        ranked
    }

    /// Resolves current subject references, skipping any that cannot be fetched.
    fn resolve_current_subjects(&self, refs: &[IdHash]) -> Vec<CurrentSubject> {
        let mut current = Vec::with_capacity(refs.len());
        for id in refs {
            let subject = match self.store.get_subject(id) {
                Ok(Some(subject)) => subject,
                Ok(None) => {
                    tracing::debug!(subject = %id, "Current subject not found, skipping");
                    continue;
                },
                Err(e) => {
                    tracing::warn!(subject = %id, error = %e, "Failed to fetch current subject, skipping");
                    continue;
                },
            };

            // Recomputed from the live object so a stale reference never leaks into proposals.
            let Some(id_hash) = self.id_hash_of(&subject) else {
                continue;
            };
            current.push(CurrentSubject {
                id_hash,
                terms: self.resolver.resolve_terms(&subject.keywords),
            });
        }
        current
    }

    /// Scores every (current, candidate) pair and emits those above threshold.
    fn pair_proposals(
        &self,
        current: &[CurrentSubject],
        pool: &[Subject],
        config: &ProposalConfig,
    ) -> Vec<Proposal> {
        let now = (self.clock)();
        let mut candidates: Vec<Candidate<'_>> = pool
            .iter()
            .map(|subject| Candidate {
                subject,
                terms: None,
            })
            .collect();

        let mut proposals = Vec::new();
        for cur in current {
            for candidate in &mut candidates {
                let past = candidate.subject;
                let past_terms: &[String] = candidate
                    .terms
                    .get_or_insert_with(|| self.resolver.resolve_terms(&past.keywords));

                let similarity = jaccard(&cur.terms, past_terms);
                if !passes_threshold(similarity, config) {
                    continue;
                }
                let Some(past_hash) = self.id_hash_of(past) else {
                    continue;
                };

                let recency =
                    recency_boost(past.recency_timestamp(), now, config.recency_window_ms);
                proposals.push(Proposal {
                    id: format!("{past_hash}:{}", cur.id_hash),
                    past_subject: past_hash,
                    current_subject: cur.id_hash.clone(),
                    matched_keywords: matched_terms(&cur.terms, past_terms),
                    relevance_score: relevance(similarity, recency, config),
                    source_topic_id: past.topic.clone(),
                    past_subject_name: past.id.clone(),
                    past_subject_description: past.description.clone(),
                    created_at: now,
                    proposal_type: ProposalType::Conversation,
                    memory_id_hash: None,
                    memory_content: None,
                });
            }
        }
        proposals
    }

    /// Collects subjects from every topic except `topic_id`.
    ///
    /// The reserved memory topic is always included. A topic whose listing
    /// fails is skipped; failures on the memory topic are expected and only
    /// logged at debug level. If the topics themselves cannot be enumerated
    /// the pool is empty.
    fn fetch_candidate_pool(&self, topic_id: &str) -> Vec<Subject> {
        let mut topic_ids = match self.topics.topic_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to enumerate topics");
                return Vec::new();
            },
        };
        if !topic_ids.iter().any(|t| t == MEMORY_TOPIC_ID) {
            topic_ids.push(MEMORY_TOPIC_ID.to_string());
        }

        let mut pool = Vec::new();
        for topic in topic_ids.iter().filter(|t| t.as_str() != topic_id) {
            match self.subjects.subjects_for_topic(topic) {
                Ok(subjects) => pool.extend(subjects.into_iter().filter(|s| s.topic != topic_id)),
                Err(e) if topic == MEMORY_TOPIC_ID => {
                    tracing::debug!(error = %e, "No memory topic subjects");
                },
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Failed to list subjects, skipping topic");
                },
            }
        }

        tracing::debug!(topics = topic_ids.len(), candidates = pool.len(), "Fetched candidate pool");
        pool
    }

    fn id_hash_of(&self, subject: &Subject) -> Option<IdHash> {
        match self.store.subject_id_hash(subject) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(subject = %subject.id, error = %e, "Failed to calculate id hash, skipping");
                None
            },
        }
    }
}

/// Whether a similarity is high enough to justify a proposal.
///
/// With a zero threshold every candidate passes and is ranked on recency alone.
fn passes_threshold(similarity: f64, config: &ProposalConfig) -> bool {
    similarity >= config.min_jaccard
}

fn memory_proposal(
    memory: &MemoryRecord,
    current_terms: &[String],
    config: &ProposalConfig,
    now: i64,
) -> Option<Proposal> {
    let memory_terms = memory_keywords(memory);
    let similarity = jaccard(current_terms, &memory_terms);
    if !passes_threshold(similarity, config) {
        return None;
    }

    let recency = recency_boost(memory.created, now, config.recency_window_ms);
    Some(Proposal {
        id: format!("memory:{}", memory.id),
        past_subject: memory.id.clone(),
        current_subject: memory.id.clone(),
        matched_keywords: matched_terms(current_terms, &memory_terms),
        relevance_score: relevance(similarity, recency, config),
        source_topic_id: MEMORY_TOPIC_ID.to_string(),
        past_subject_name: memory.name.clone(),
        past_subject_description: memory.description.clone(),
        created_at: now,
        proposal_type: ProposalType::Memory,
        memory_id_hash: Some(memory.id.clone()),
        memory_content: Some(memory.content_preview()),
    })
}
