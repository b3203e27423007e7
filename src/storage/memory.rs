//! In-process content-addressed store.
//!
//! Implements every collaborator trait over hash maps. Id hashes are SHA-256
//! digests of an object's identifying fields, so storing the same keyword
//! term twice yields the same id hash.

use crate::models::{IdHash, Keyword, MemoryRecord, Subject, TimeRange, normalize_term};
use crate::storage::traits::{MemoryStore, ObjectStore, SubjectEnumerator, TopicEnumerator};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::RwLock;

/// Object maps guarded together so subject filing stays consistent.
#[derive(Debug, Default)]
struct Objects {
    keywords: HashMap<IdHash, Keyword>,
    subjects: HashMap<IdHash, Subject>,
    /// Topic to subject id hashes, in insertion order.
    topics: HashMap<String, Vec<IdHash>>,
    /// Topics in first-seen order.
    topic_order: Vec<String>,
    memories: HashMap<IdHash, MemoryRecord>,
    memory_order: Vec<IdHash>,
}

/// In-memory implementation of the object, topic, subject, and memory stores.
///
/// # Thread Safety
///
/// All maps live behind one `RwLock`. A poisoned lock surfaces as
/// [`Error::OperationFailed`], which the engine treats as a store failure.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: RwLock<Objects>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the id hash of a keyword from its normalized term.
    #[must_use]
    pub fn keyword_id_hash(term: &str) -> IdHash {
        hash_parts(&["keyword", &normalize_term(term)])
    }

    /// Calculates the id hash of a subject from its topic and display id.
    #[must_use]
    pub fn calculate_subject_id_hash(topic: &str, subject_id: &str) -> IdHash {
        hash_parts(&["subject", topic, subject_id])
    }

    /// Stores a keyword, returning its id hash.
    ///
    /// The term is normalized first; a keyword with the same term replaces
    /// the previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn store_keyword(&self, mut keyword: Keyword) -> Result<IdHash> {
        keyword.term = normalize_term(&keyword.term);
        let id = Self::keyword_id_hash(&keyword.term);
        let mut guard = self.write("store_keyword")?;
        guard.keywords.insert(id.clone(), keyword);
        Ok(id)
    }

    /// Stores a subject and files it under its topic, returning its id hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn store_subject(&self, subject: Subject) -> Result<IdHash> {
        let id = Self::calculate_subject_id_hash(&subject.topic, &subject.id);
        let mut guard = self.write("store_subject")?;
        register_topic(&mut guard, &subject.topic);
        let filed = guard.topics.entry(subject.topic.clone()).or_default();
        if !filed.contains(&id) {
            filed.push(id.clone());
        }
        guard.subjects.insert(id.clone(), subject);
        Ok(id)
    }

    /// Registers a topic that may not have any subjects yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn add_topic(&self, topic_id: &str) -> Result<()> {
        let mut guard = self.write("add_topic")?;
        register_topic(&mut guard, topic_id);
        guard.topics.entry(topic_id.to_string()).or_default();
        Ok(())
    }

    /// Stores a memory record under its own id.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn store_memory(&self, memory: MemoryRecord) -> Result<IdHash> {
        let id = memory.id.clone();
        let mut guard = self.write("store_memory")?;
        if guard.memories.insert(id.clone(), memory).is_none() {
            guard.memory_order.push(id.clone());
        }
        Ok(id)
    }

    /// Removes a keyword, as pruning would.
    ///
    /// Returns `true` if the keyword existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn prune_keyword(&self, id: &IdHash) -> Result<bool> {
        let mut guard = self.write("prune_keyword")?;
        Ok(guard.keywords.remove(id).is_some())
    }

    /// Stores a subject together with keywords for the given terms.
    ///
    /// Duplicate terms (after normalization) are stored once. The subject's
    /// `keywords` field is replaced with the resulting id hashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn store_subject_with_terms(&self, mut subject: Subject, terms: &[String]) -> Result<IdHash> {
        let mut seen = BTreeSet::new();
        let mut refs = Vec::with_capacity(terms.len());
        for term in terms {
            let normalized = normalize_term(term);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }
            let mut keyword = Keyword::new(&normalized);
            keyword.created_at = subject.created_at;
            keyword.last_seen = subject.last_seen_at;
            keyword.frequency = 1;
            refs.push(self.store_keyword(keyword)?);
        }
        subject.keywords = refs;
        self.store_subject(subject)
    }

    /// Builds a store from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let store = Self::new();
        for topic in &snapshot.topics {
            store.add_topic(topic)?;
        }
        for entry in snapshot.subjects {
            let (subject, terms) = entry.into_subject();
            store.store_subject_with_terms(subject, &terms)?;
        }
        for memory in snapshot.memories {
            store.store_memory(memory)?;
        }
        Ok(store)
    }

    /// Loads a store from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
                operation: "read_snapshot".to_string(),
                cause: e.to_string(),
            })?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| Error::InvalidInput(format!("malformed snapshot: {e}")))?;
        Self::from_snapshot(snapshot)
    }

    fn read(&self, operation: &str) -> Result<std::sync::RwLockReadGuard<'_, Objects>> {
        self.objects.read().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "Lock poisoned".to_string(),
        })
    }

    fn write(&self, operation: &str) -> Result<std::sync::RwLockWriteGuard<'_, Objects>> {
        self.objects.write().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "Lock poisoned".to_string(),
        })
    }
}

impl ObjectStore for InMemoryStore {
    fn get_keyword(&self, id: &IdHash) -> Result<Option<Keyword>> {
        Ok(self.read("get_keyword")?.keywords.get(id).cloned())
    }

    fn get_subject(&self, id: &IdHash) -> Result<Option<Subject>> {
        Ok(self.read("get_subject")?.subjects.get(id).cloned())
    }

    fn subject_id_hash(&self, subject: &Subject) -> Result<IdHash> {
        Ok(Self::calculate_subject_id_hash(&subject.topic, &subject.id))
    }
}

impl TopicEnumerator for InMemoryStore {
    fn topic_ids(&self) -> Result<Vec<String>> {
        Ok(self.read("topic_ids")?.topic_order.clone())
    }
}

impl SubjectEnumerator for InMemoryStore {
    fn subjects_for_topic(&self, topic_id: &str) -> Result<Vec<Subject>> {
        let guard = self.read("subjects_for_topic")?;
        let ids = guard
            .topics
            .get(topic_id)
            .ok_or_else(|| Error::InvalidInput(format!("unknown topic '{topic_id}'")))?;
        Ok(ids
            .iter()
            .filter_map(|id| guard.subjects.get(id).cloned())
            .collect())
    }
}

impl MemoryStore for InMemoryStore {
    fn list_memory_ids(&self) -> Result<Vec<IdHash>> {
        Ok(self.read("list_memory_ids")?.memory_order.clone())
    }

    fn get_memory(&self, id: &IdHash) -> Result<Option<MemoryRecord>> {
        Ok(self.read("get_memory")?.memories.get(id).cloned())
    }
}

fn register_topic(objects: &mut Objects, topic_id: &str) {
    if !objects.topics.contains_key(topic_id) {
        objects.topic_order.push(topic_id.to_string());
    }
}

fn hash_parts(parts: &[&str]) -> IdHash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    IdHash::new(hex::encode(hasher.finalize()))
}

/// Serialized store contents, with subject keywords given as plain terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Topics to register even if they have no subjects.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Subjects and their keyword terms.
    #[serde(default)]
    pub subjects: Vec<SnapshotSubject>,
    /// Memory records.
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
}

/// A subject as written in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSubject {
    /// Display identifier.
    pub id: String,
    /// Owning topic.
    pub topic: String,
    /// Keyword terms.
    #[serde(default)]
    pub terms: Vec<String>,
    /// Discussion time ranges.
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    /// Message count.
    #[serde(default)]
    pub message_count: u32,
    /// Creation timestamp (Unix epoch milliseconds).
    #[serde(default)]
    pub created_at: i64,
    /// Last seen timestamp (Unix epoch milliseconds).
    #[serde(default)]
    pub last_seen_at: i64,
    /// Archived flag.
    #[serde(default)]
    pub archived: bool,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl SnapshotSubject {
    fn into_subject(self) -> (Subject, Vec<String>) {
        let subject = Subject {
            id: self.id,
            topic: self.topic,
            keywords: Vec::new(),
            time_ranges: self.time_ranges,
            message_count: self.message_count,
            created_at: self.created_at,
            last_seen_at: self.last_seen_at,
            archived: self.archived,
            description: self.description,
        };
        (subject, self.terms)
    }
}
