//! Proposal types.

use super::IdHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Knowledge source a proposal was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalType {
    /// A past conversation subject.
    Conversation,
    /// A stored memory.
    Memory,
}

impl ProposalType {
    /// Returns the proposal type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A suggested link between the current context and past knowledge.
///
/// `matched_keywords` is always a subset of both the current and the past
/// keyword-term sets, and `relevance_score` lies in
/// `[0, match_weight + recency_weight]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Proposal identifier.
    pub id: String,
    /// Id hash of the past subject (or memory).
    pub past_subject: IdHash,
    /// Id hash of the current subject.
    pub current_subject: IdHash,
    /// Terms shared by both sides.
    pub matched_keywords: Vec<String>,
    /// Combined similarity and recency score.
    pub relevance_score: f64,
    /// Topic the past knowledge came from.
    pub source_topic_id: String,
    /// Display name of the past subject or memory.
    pub past_subject_name: String,
    /// Optional description of the past subject or memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_subject_description: Option<String>,
    /// Creation timestamp (Unix epoch milliseconds).
    pub created_at: i64,
    /// Knowledge source.
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    /// Memory id hash, for memory proposals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_id_hash: Option<IdHash>,
    /// Content preview, for memory proposals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_content: Option<String>,
}
