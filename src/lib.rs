//! # Reminisce
//!
//! Surfaces previously captured knowledge that is relevant to the conversation
//! happening right now.
//!
//! Past conversation subjects and stored memories are compared against the
//! current context by keyword-set similarity, weighted by recency, and offered
//! back as "you discussed this before" proposals.
//!
//! ## Components
//!
//! - Keyword resolution over a content-addressed object store
//! - Jaccard similarity and linear recency decay scoring
//! - Proposal generation for topics, free text, memories, and a merged view
//! - LRU + TTL memoization keyed by conversation state
//!
//! ## Example
//!
//! ```rust,ignore
//! use reminisce::{ProposalConfig, ProposalEngine};
//!
//! let engine = ProposalEngine::new(store.clone(), store.clone(), store.clone())
//!     .with_memory_store(store);
//! let proposals = engine.combined_proposals("chat-1", &current_refs, &ProposalConfig::default());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::{CacheConfig, LoggingSettings, ProposalConfig, ReminisceConfig};
pub use models::{IdHash, Keyword, MemoryRecord, Proposal, ProposalType, Subject, TimeRange};
pub use services::{ProposalCache, ProposalEngine, ProposalRanker, ProposalService};
pub use storage::{InMemoryStore, MemoryStore, ObjectStore, SubjectEnumerator, TopicEnumerator};

/// Error type for reminisce operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Config values out of range, malformed snapshot data |
/// | `OperationFailed` | Config file I/O, logging initialization |
/// | `StoreUnavailable` | A collaborator store cannot answer at all |
///
/// An object that is simply missing from a store is not an error; fetches
/// report that as `Ok(None)`.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A collaborator store could not be reached or answered with a fault.
    ///
    /// Raised when:
    /// - Topic enumeration fails
    /// - A per-topic subject listing fails
    /// - A keyword, subject, or memory fetch fails for reasons other than absence
    #[error("store unavailable during '{operation}': {cause}")]
    StoreUnavailable {
        /// The operation that was attempted.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for reminisce operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Timestamps throughout the crate (subject time ranges, memory creation,
/// proposal creation) are Unix epoch milliseconds.
///
/// # Examples
///
/// ```rust
/// use reminisce::current_timestamp_ms;
///
/// let ts = current_timestamp_ms();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::StoreUnavailable {
            operation: "list_topics".to_string(),
            cause: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "store unavailable during 'list_topics': connection reset"
        );
    }

    #[test]
    fn test_current_timestamp_is_millis() {
        // Anything after 2001-09-09 in milliseconds has 13 digits.
        assert!(current_timestamp_ms() > 1_000_000_000_000);
    }
}
