//! Collaborator traits.
//!
//! The proposal engine reads from stores it does not own. Each store is an
//! injected trait object so the engine can run against fakes in tests.

mod memory;
mod object;
mod topics;

pub use memory::MemoryStore;
pub use object::ObjectStore;
pub use topics::{SubjectEnumerator, TopicEnumerator};
