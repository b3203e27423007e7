//! Memory store trait.

use crate::Result;
use crate::models::{IdHash, MemoryRecord};

/// Trait for stores of standalone memory records.
pub trait MemoryStore: Send + Sync {
    /// Lists all memory identifiers.
    fn list_memory_ids(&self) -> Result<Vec<IdHash>>;

    /// Retrieves a memory by identifier, `Ok(None)` if it no longer exists.
    fn get_memory(&self, id: &IdHash) -> Result<Option<MemoryRecord>>;
}
