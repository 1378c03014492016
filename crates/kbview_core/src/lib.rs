//! Reconciliation core for the knowledge-base viewer.
//! Rebuilds ordered, hierarchical, deduplicated views from flat backend
//! records and tracks unread state across polling and navigation.

pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod render;
pub mod service;
pub mod tree;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::comment::{CommentId, CommentRecord};
pub use model::document::{DocType, DocumentId, DocumentRecord};
pub use model::feed::FeedEvent;
pub use model::heading::{HeadingEntry, HeadingLevel};
pub use model::record::{
    decode_batch, BatchKind, BatchRecord, FlatRecord, InvalidInputError, SiblingLinked,
};
pub use notify::client::{
    StatusClient, StreamKind, StreamStatus, TransportError, TransportErrorKind,
};
pub use notify::session::{
    Acknowledgement, NotificationSession, ViewEntry, DEFAULT_POLL_INTERVAL,
};
pub use notify::state::{NotificationState, UnseenState};
pub use render::{RegionKind, RenderedElement, RenderedNode};
pub use service::comment_thread::{assemble_comments, CommentNode, CommentThread};
pub use service::document_outline::{DocumentOutline, OutlineEntry};
pub use service::feed_dedup::{collapse_runs, dedupe_feed};
pub use service::heading_outline::{extract_headings, HeadingExtractor};
pub use tree::forest::{build_forest, Forest, ForestBuilder, NestedNode, TreeNode};
pub use tree::sibling_order::{order_forest, order_siblings};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
