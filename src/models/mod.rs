//! Data models for reminisce.
//!
//! Keywords, subjects, and memories are owned by external stores and only
//! referenced here by [`IdHash`]. Proposals are ephemeral and never persisted.

mod id;
mod keyword;
mod memory;
mod proposal;
mod subject;

pub use id::IdHash;
pub use keyword::{Keyword, normalize_term};
pub use memory::{MEMORY_CONTENT_PREVIEW_CHARS, MemoryRecord};
pub use proposal::{Proposal, ProposalType};
pub use subject::{Subject, TimeRange};
