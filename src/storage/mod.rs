//! Storage layer abstraction.
//!
//! Collaborator traits for the stores the proposal engine reads from, plus an
//! in-process implementation of all of them.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryStore, Snapshot, SnapshotSubject};
pub use traits::{MemoryStore, ObjectStore, SubjectEnumerator, TopicEnumerator};
