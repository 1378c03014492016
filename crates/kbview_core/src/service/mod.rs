//! Display-ready views reconstructed from flat backend batches.
//!
//! # Responsibility
//! - Turn fetched batches into outline trees, reply threads, deduplicated
//!   feeds and heading outlines.
//! - Keep every operation synchronous and side-effect free apart from logging.
//!
//! # Invariants
//! - Outputs are immutable snapshots rebuilt from scratch on every fetch.
//! - Malformed linkage degrades; it never returns an error.

pub mod comment_thread;
pub mod document_outline;
pub mod feed_dedup;
pub mod heading_outline;
