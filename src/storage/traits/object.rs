//! Content-addressed object store trait.

use crate::Result;
use crate::models::{IdHash, Keyword, Subject};

/// Trait for content-addressed object stores.
///
/// Objects are fetched by id hash. A fetch that finds nothing returns
/// `Ok(None)`: objects are routinely pruned, so absence is an expected
/// outcome rather than a failure. `Err` is reserved for a store that cannot
/// answer.
pub trait ObjectStore: Send + Sync {
    /// Retrieves a keyword by id hash.
    fn get_keyword(&self, id: &IdHash) -> Result<Option<Keyword>>;

    /// Retrieves a subject by id hash.
    fn get_subject(&self, id: &IdHash) -> Result<Option<Subject>>;

    /// Calculates the id hash of a subject from its identifying fields.
    fn subject_id_hash(&self, subject: &Subject) -> Result<IdHash>;
}
