//! Flat-record to forest reconstruction.
//!
//! # Responsibility
//! - Assemble parent-referencing flat records into an arena-backed forest.
//! - Order sibling lists from "previous sibling" hints.
//!
//! # Invariants
//! - Every distinct input identity appears exactly once in the forest.
//! - Malformed linkage degrades to roots or input order; it never fails.
//! - Parent links are lookups through the identity map, not ownership edges.

pub mod forest;
pub mod sibling_order;
