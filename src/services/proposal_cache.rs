//! Proposal memoization.
//!
//! Caches computed proposal lists keyed by the conversation state that
//! produced them: the topic and the set of current subject references.

use crate::config::CacheConfig;
use crate::models::{IdHash, Proposal};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Entry in the proposal cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached proposals.
    proposals: Vec<Proposal>,
    /// When this entry was stored.
    stored_at: Instant,
}

/// LRU + TTL cache of proposal lists.
///
/// # How it works
///
/// 1. Keys are `topic + ":" + sorted(refs).join(",")`
/// 2. Reads never refresh an entry's position, so eviction order is
///    insertion order and the evicted entry is always the oldest one
/// 3. Expired entries are removed lazily when read
/// 4. Overwriting an existing key keeps its position
///
/// # Thread Safety
///
/// A single `Mutex` guards the map so that read-check-expire and
/// check-evict-insert happen atomically. Lock poisoning fails open: reads
/// report a miss and writes are skipped. A missing proposal is never worse
/// than a stale one.
///
/// # Invalidation
///
/// [`invalidate`](Self::invalidate) removes only keys of exactly the given
/// topic: `"chat-1"` does not touch entries of `"chat-10"`.
pub struct ProposalCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ProposalCache {
    /// Creates a cache holding at most `max_size` lists for `ttl` each.
    ///
    /// A `max_size` of zero is treated as one.
    #[must_use]
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.ttl)
    }

    /// Builds the cache key for a topic and its current subject references.
    #[must_use]
    pub fn cache_key(topic_id: &str, current_subject_refs: &[IdHash]) -> String {
        let mut refs: Vec<&str> = current_subject_refs.iter().map(IdHash::as_str).collect();
        refs.sort_unstable();
        format!("{topic_id}:{}", refs.join(","))
    }

    /// Returns the cached proposals, or `None` on a miss or expired entry.
    #[instrument(skip(self, current_subject_refs), fields(operation = "proposal_cache_get", topic = %topic_id))]
    pub fn get(&self, topic_id: &str, current_subject_refs: &[IdHash]) -> Option<Vec<Proposal>> {
        let key = Self::cache_key(topic_id, current_subject_refs);
        let mut cache = self.cache.lock().ok()?;

        let expired = match cache.peek(&key) {
            None => {
                metrics::counter!("proposal_cache_misses_total", "reason" => "absent").increment(1);
                return None;
            },
            Some(entry) => entry.stored_at.elapsed() > self.ttl,
        };

        if expired {
            cache.pop(&key);
            tracing::debug!(key = %key, "Proposal cache entry expired");
            metrics::counter!("proposal_cache_misses_total", "reason" => "expired").increment(1);
            metrics::gauge!("proposal_cache_size").set(cache.len() as f64);
            return None;
        }

        metrics::counter!("proposal_cache_hits_total").increment(1);
        cache.peek(&key).map(|entry| entry.proposals.clone())
    }

    /// Stores proposals for a topic and its current subject references.
    ///
    /// When the cache is full and the key is new, the oldest entry is evicted.
    #[instrument(
        skip(self, current_subject_refs, proposals),
        fields(operation = "proposal_cache_set", topic = %topic_id, count = proposals.len())
    )]
    pub fn set(&self, topic_id: &str, current_subject_refs: &[IdHash], proposals: Vec<Proposal>) {
        let key = Self::cache_key(topic_id, current_subject_refs);
        let entry = CacheEntry {
            proposals,
            stored_at: Instant::now(),
        };

        let Ok(mut cache) = self.cache.lock() else {
            tracing::warn!(key = %key, "Proposal cache lock poisoned, skipping store");
            return;
        };

        if let Some(existing) = cache.peek_mut(&key) {
            *existing = entry;
            return;
        }

        if cache.len() >= cache.cap().get() {
            if let Some((evicted, _)) = cache.pop_lru() {
                tracing::debug!(evicted = %evicted, "Evicted oldest proposal cache entry");
                metrics::counter!("proposal_cache_evictions_total", "reason" => "capacity")
                    .increment(1);
            }
        }
        cache.put(key, entry);
        metrics::gauge!("proposal_cache_size").set(cache.len() as f64);
    }

    /// Removes every entry of the given topic. Returns how many were removed.
    pub fn invalidate(&self, topic_id: &str) -> usize {
        let prefix = format!("{topic_id}:");
        let Ok(mut cache) = self.cache.lock() else {
            return 0;
        };

        let keys: Vec<String> = cache
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            cache.pop(key);
        }

        if !keys.is_empty() {
            tracing::debug!(topic = %topic_id, removed = keys.len(), "Invalidated proposal cache entries");
            metrics::counter!("proposal_cache_evictions_total", "reason" => "invalidated")
                .increment(keys.len() as u64);
            metrics::gauge!("proposal_cache_size").set(cache.len() as f64);
        }
        keys.len()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
            metrics::gauge!("proposal_cache_size").set(0.0);
        }
    }

    /// Returns the number of entries, including expired ones not yet read.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for ProposalCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProposalType;
    use std::sync::Arc;
    use std::thread;

    fn proposal(id: &str) -> Proposal {
        Proposal {
            id: id.to_string(),
            past_subject: IdHash::new(id),
            current_subject: IdHash::new("current"),
            matched_keywords: vec!["database".to_string()],
            relevance_score: 0.5,
            source_topic_id: "chat-2".to_string(),
            past_subject_name: id.to_string(),
            past_subject_description: None,
            created_at: 0,
            proposal_type: ProposalType::Conversation,
            memory_id_hash: None,
            memory_content: None,
        }
    }

    fn refs(ids: &[&str]) -> Vec<IdHash> {
        ids.iter().map(|id| IdHash::new(*id)).collect()
    }

    #[test]
    fn test_defaults() {
        let cache = ProposalCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(60));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_key_sorts_refs() {
        assert_eq!(
            ProposalCache::cache_key("chat-1", &refs(&["b", "a", "c"])),
            "chat-1:a,b,c"
        );
        assert_eq!(ProposalCache::cache_key("chat-1", &[]), "chat-1:");
    }

    #[test]
    fn test_set_then_get() {
        let cache = ProposalCache::new(10, Duration::from_secs(60));
        cache.set("chat-1", &refs(&["s1", "s2"]), vec![proposal("p1")]);

        let hit = cache.get("chat-1", &refs(&["s2", "s1"])).unwrap();
        assert_eq!(hit, vec![proposal("p1")]);
        assert!(cache.get("chat-1", &refs(&["s1"])).is_none());
        assert!(cache.get("chat-2", &refs(&["s1", "s2"])).is_none());
    }

    #[test]
    fn test_get_expired() {
        let cache = ProposalCache::new(10, Duration::from_millis(50));
        cache.set("chat-1", &refs(&["s1"]), vec![proposal("p1")]);

        thread::sleep(Duration::from_millis(100));

        assert!(cache.get("chat-1", &refs(&["s1"])).is_none());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_evicts_oldest_inserted() {
        let cache = ProposalCache::new(2, Duration::from_secs(60));
        cache.set("k1", &[], vec![proposal("p1")]);
        cache.set("k2", &[], vec![proposal("p2")]);

        // Reading k1 must not protect it from eviction.
        assert!(cache.get("k1", &[]).is_some());

        cache.set("k3", &[], vec![proposal("p3")]);

        assert_eq!(cache.size(), 2);
        assert!(cache.get("k1", &[]).is_none());
        assert!(cache.get("k2", &[]).is_some());
        assert!(cache.get("k3", &[]).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = ProposalCache::new(2, Duration::from_secs(60));
        cache.set("k1", &[], vec![proposal("old")]);
        cache.set("k2", &[], vec![proposal("p2")]);
        cache.set("k1", &[], vec![proposal("new")]);

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("k1", &[]).unwrap()[0].id, "new");

        // k1 kept its original position, so it is still the oldest.
        cache.set("k3", &[], vec![proposal("p3")]);
        assert!(cache.get("k1", &[]).is_none());
        assert!(cache.get("k2", &[]).is_some());
    }

    #[test]
    fn test_invalidate_exact_topic_only() {
        let cache = ProposalCache::new(10, Duration::from_secs(60));
        cache.set("chat-1", &refs(&["abc"]), vec![proposal("p1")]);
        cache.set("chat-1", &refs(&["def"]), vec![proposal("p2")]);
        cache.set("chat-10", &refs(&["xyz"]), vec![proposal("p3")]);

        assert_eq!(cache.invalidate("chat-1"), 2);

        assert!(cache.get("chat-1", &refs(&["abc"])).is_none());
        assert!(cache.get("chat-10", &refs(&["xyz"])).is_some());
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.invalidate("chat-1"), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ProposalCache::new(10, Duration::from_secs(60));
        cache.set("a", &[], vec![]);
        cache.set("b", &[], vec![]);
        assert_eq!(cache.size(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_treated_as_one() {
        let cache = ProposalCache::new(0, Duration::from_secs(60));
        cache.set("a", &[], vec![]);
        cache.set("b", &[], vec![]);
        assert_eq!(cache.size(), 1);
        assert!(cache.get("b", &[]).is_some());
    }

    #[test]
    fn test_thread_safety() {
        let cache = Arc::new(ProposalCache::new(100, Duration::from_secs(60)));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..25 {
                        let topic = format!("topic-{t}");
                        let id = format!("s{i}");
                        let r = refs(&[id.as_str()]);
                        cache.set(&topic, &r, vec![proposal("p")]);
                        assert!(cache.get(&topic, &r).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 100);
    }
}
