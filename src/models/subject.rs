//! Subject records.

use super::IdHash;
use serde::{Deserialize, Serialize};

/// A span of conversation time in which a subject was discussed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start (Unix epoch milliseconds).
    pub start: i64,
    /// End (Unix epoch milliseconds).
    pub end: i64,
}

/// A recurring theme inferred from a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Display identifier, usually derived from the top keywords.
    pub id: String,
    /// Topic (conversation) that produced this subject.
    pub topic: String,
    /// References to the subject's keywords.
    #[serde(default)]
    pub keywords: Vec<IdHash>,
    /// When the subject was discussed.
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    /// Number of messages attributed to the subject.
    #[serde(default)]
    pub message_count: u32,
    /// Creation timestamp (Unix epoch milliseconds).
    #[serde(default)]
    pub created_at: i64,
    /// Last time the subject was seen (Unix epoch milliseconds).
    #[serde(default)]
    pub last_seen_at: i64,
    /// Whether the subject has been archived.
    #[serde(default)]
    pub archived: bool,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Subject {
    /// Returns the timestamp used for recency scoring.
    ///
    /// This is the start of the first time range, or `created_at` when the
    /// subject has no recorded time ranges.
    #[must_use]
    pub fn recency_timestamp(&self) -> i64 {
        self.time_ranges
            .first()
            .map_or(self.created_at, |range| range.start)
    }
}
