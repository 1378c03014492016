//! Comment reply record.
//!
//! # Invariants
//! - `parent_id` references another comment of the same batch, or nothing.
//! - No ordering hint exists; server order is authoritative.

use crate::model::record::{BatchKind, BatchRecord, FlatRecord};
use serde::{Deserialize, Serialize};

/// Server-assigned comment identity.
pub type CommentId = i64;

/// Flat comment as supplied by the comment fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(alias = "yuque_id")]
    pub id: CommentId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(default)]
    pub body: String,
    /// Pre-rendered body. Sanitization belongs to the rendering collaborator.
    #[serde(default)]
    pub body_html: Option<String>,
}

impl CommentRecord {
    pub fn new(id: CommentId, author_id: i64, body: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: None,
            created_at: None,
            author_id,
            body: body.into(),
            body_html: None,
        }
    }

    /// Marks this comment as a reply to `parent_id`.
    pub fn reply_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

impl FlatRecord for CommentRecord {
    type Id = CommentId;

    fn record_id(&self) -> &CommentId {
        &self.id
    }

    fn parent_id(&self) -> Option<&CommentId> {
        self.parent_id.as_ref()
    }
}

impl BatchRecord for CommentRecord {
    const KIND: BatchKind = BatchKind::Comments;
}
