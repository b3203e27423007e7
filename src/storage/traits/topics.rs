//! Topic and subject enumeration traits.

use crate::Result;
use crate::models::Subject;

/// Lists the conversation topics that exist.
pub trait TopicEnumerator: Send + Sync {
    /// Returns every known topic identifier.
    fn topic_ids(&self) -> Result<Vec<String>>;
}

/// Lists the subjects filed under a topic.
pub trait SubjectEnumerator: Send + Sync {
    /// Returns all subjects for the given topic.
    ///
    /// A topic with no subjects returns an empty list. Implementations may
    /// return an error for a topic they have never seen.
    fn subjects_for_topic(&self, topic_id: &str) -> Result<Vec<Subject>>;
}
