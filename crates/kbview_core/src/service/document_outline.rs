//! Document outline use-case.
//!
//! # Responsibility
//! - Assemble the document table of contents from flat outline entries.
//! - Order every sibling group by its previous-sibling chain.
//! - Resolve routing slugs and breadcrumb paths against the assembled outline.
//!
//! # Invariants
//! - Ancestor walks are capped (`DEFAULT_MAX_ANCESTOR_DEPTH` by default).
//! - `entries()` is a pre-order walk matching the rendered sidebar order.

use crate::model::document::DocumentRecord;
use crate::tree::forest::{Forest, ForestBuilder, NestedNode};
use crate::tree::sibling_order::order_forest;

/// Outline row with its zero-based nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry<'a> {
    pub depth: usize,
    pub document: &'a DocumentRecord,
}

/// Assembled and ordered document outline.
#[derive(Debug, Clone)]
pub struct DocumentOutline {
    forest: Forest<DocumentRecord>,
}

impl DocumentOutline {
    /// Builds the outline with the default ancestor walk cap.
    pub fn build(records: impl IntoIterator<Item = DocumentRecord>) -> Self {
        Self::build_with(ForestBuilder::new(), records)
    }

    /// Builds the outline with a caller-provided forest builder.
    pub fn build_with(
        builder: ForestBuilder,
        records: impl IntoIterator<Item = DocumentRecord>,
    ) -> Self {
        let mut forest = builder.build(records);
        order_forest(&mut forest);
        Self { forest }
    }

    pub fn forest(&self) -> &Forest<DocumentRecord> {
        &self.forest
    }

    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Top-level entries in presentation order.
    pub fn roots(&self) -> Vec<&DocumentRecord> {
        self.resolve(self.forest.roots())
    }

    /// Direct children of `uuid` in presentation order.
    pub fn children(&self, uuid: &str) -> Vec<&DocumentRecord> {
        self.resolve(self.forest.children_of(uuid))
    }

    /// Flattened outline in sidebar order.
    pub fn entries(&self) -> Vec<OutlineEntry<'_>> {
        self.forest
            .depth_first()
            .into_iter()
            .map(|(depth, node)| OutlineEntry {
                depth,
                document: node.payload(),
            })
            .collect()
    }

    /// First outline entry (sidebar order) carrying `slug`.
    pub fn find_by_slug(&self, slug: &str) -> Option<&DocumentRecord> {
        self.entries()
            .into_iter()
            .map(|entry| entry.document)
            .find(|document| document.slug.as_deref() == Some(slug))
    }

    /// Ancestors of `uuid`, outermost first.
    pub fn breadcrumbs(&self, uuid: &str) -> Vec<&DocumentRecord> {
        self.forest
            .ancestors(uuid)
            .into_iter()
            .filter_map(|id| self.forest.get(id).map(|node| node.payload()))
            .collect()
    }

    /// Consumes the outline into owned nested nodes.
    pub fn into_nested(self) -> Vec<NestedNode<DocumentRecord>> {
        self.forest.into_nested()
    }

    fn resolve(&self, ids: &[String]) -> Vec<&DocumentRecord> {
        ids.iter()
            .filter_map(|id| self.forest.get(id).map(|node| node.payload()))
            .collect()
    }
}
