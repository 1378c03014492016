//! Activity feed event.

use crate::model::record::{BatchKind, BatchRecord};
use serde::{Deserialize, Serialize};

/// One activity entry. Batches arrive newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    /// Document the activity refers to.
    #[serde(alias = "doc_uuid")]
    pub subject_id: String,
    /// Backend action name, e.g. `publish` or `update`.
    pub action_type: String,
    /// Epoch milliseconds.
    #[serde(alias = "created_at")]
    pub timestamp: i64,
    #[serde(default, alias = "doc_title")]
    pub subject_title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl FeedEvent {
    pub fn new(
        subject_id: impl Into<String>,
        action_type: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            action_type: action_type.into(),
            timestamp,
            subject_title: None,
            author_name: None,
            summary: None,
        }
    }

    /// Returns `true` when both events describe the same action on the same subject.
    pub fn same_activity(&self, other: &FeedEvent) -> bool {
        self.subject_id == other.subject_id && self.action_type == other.action_type
    }
}

impl BatchRecord for FeedEvent {
    const KIND: BatchKind = BatchKind::Feed;

    fn blank_identifier(&self) -> Option<&'static str> {
        if self.subject_id.trim().is_empty() {
            return Some("subject_id");
        }
        if self.action_type.trim().is_empty() {
            return Some("action_type");
        }
        None
    }
}
