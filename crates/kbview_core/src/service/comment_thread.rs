//! Comment reply thread use-case.
//!
//! # Responsibility
//! - Assemble reply trees from a flat comment batch.
//!
//! # Invariants
//! - Roots and replies keep server (input) order at every level.
//! - Nesting depth is unbounded.
//! - A reply whose parent is missing from the batch is shown as a root.

use crate::model::comment::CommentRecord;
use crate::tree::forest::{ForestBuilder, NestedNode};
use log::debug;

/// One comment with its replies embedded.
pub type CommentNode = NestedNode<CommentRecord>;

/// Assembled reply threads for one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentThread {
    /// Top-level comments in server order.
    pub roots: Vec<CommentNode>,
    /// Number of distinct comments across all threads.
    pub total_count: usize,
}

impl CommentThread {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Assembles reply threads from one comment batch.
pub fn assemble_comments(comments: impl IntoIterator<Item = CommentRecord>) -> CommentThread {
    let forest = ForestBuilder::unbounded().build(comments);
    let total_count = forest.len();
    let roots = forest.into_nested();
    debug!(
        "event=comment_thread_assembled module=service comments={} threads={}",
        total_count,
        roots.len()
    );
    CommentThread { roots, total_count }
}
