//! Typed records delivered by the backend fetch collaborators.
//!
//! # Responsibility
//! - Define the flat record shapes consumed by the reconciliation services.
//! - Decode backend JSON batches into typed records, reporting type violations.
//!
//! # Invariants
//! - Records reference their structural position only via identity fields.
//! - Empty-string parent/sibling references are normalized to `None`.
//! - Timestamps are Unix epoch milliseconds.

pub mod comment;
pub mod document;
pub mod feed;
pub mod heading;
pub mod record;
