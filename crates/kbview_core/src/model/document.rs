//! Document outline record.
//!
//! # Responsibility
//! - Define the table-of-contents entry used to assemble the document outline.
//!
//! # Invariants
//! - `uuid` is the structural identity; `slug` is the routing key.
//! - `prev_uuid` is an ordering hint only and never affects parentage.

use crate::model::record::{empty_as_none, BatchKind, BatchRecord, FlatRecord, SiblingLinked};
use serde::{Deserialize, Serialize};

/// Structural identity of one outline entry.
pub type DocumentId = String;

/// Outline entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum DocType {
    /// Grouping title without its own body.
    Section,
    /// Readable document.
    Leaf,
}

impl From<String> for DocType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "SECTION" | "TITLE" => Self::Section,
            _ => Self::Leaf,
        }
    }
}

/// Flat outline entry as supplied by the document fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub uuid: DocumentId,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_uuid: Option<DocumentId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub prev_uuid: Option<DocumentId>,
    /// Serialized as `type` to match the backend field name.
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Server-side nesting hint. Informational; structure comes from `parent_uuid`.
    #[serde(default)]
    pub depth: Option<u32>,
}

impl DocumentRecord {
    /// Creates one outline entry without linkage.
    pub fn new(uuid: impl Into<DocumentId>, doc_type: DocType, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            parent_uuid: None,
            prev_uuid: None,
            doc_type,
            title: title.into(),
            slug: None,
            depth: None,
        }
    }

    /// Sets the declared parent.
    pub fn with_parent(mut self, parent_uuid: impl Into<DocumentId>) -> Self {
        self.parent_uuid = Some(parent_uuid.into());
        self
    }

    /// Sets the previous-sibling hint.
    pub fn with_prev(mut self, prev_uuid: impl Into<DocumentId>) -> Self {
        self.prev_uuid = Some(prev_uuid.into());
        self
    }

    /// Sets the routing slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn is_section(&self) -> bool {
        self.doc_type == DocType::Section
    }
}

impl FlatRecord for DocumentRecord {
    type Id = DocumentId;

    fn record_id(&self) -> &DocumentId {
        &self.uuid
    }

    fn parent_id(&self) -> Option<&DocumentId> {
        self.parent_uuid.as_ref()
    }
}

impl SiblingLinked for DocumentRecord {
    fn previous_sibling_id(&self) -> Option<&DocumentId> {
        self.prev_uuid.as_ref()
    }
}

impl BatchRecord for DocumentRecord {
    const KIND: BatchKind = BatchKind::Documents;

    fn blank_identifier(&self) -> Option<&'static str> {
        self.uuid.trim().is_empty().then_some("uuid")
    }
}

#[cfg(test)]
mod tests {
    use super::{DocType, DocumentRecord};
    use crate::model::record::decode_batch;

    #[test]
    fn backend_title_maps_to_section() {
        let records = decode_batch::<DocumentRecord>(
            r#"[{"uuid": "a", "parent_uuid": "", "prev_uuid": null, "type": "TITLE", "title": "Guide"},
                {"uuid": "b", "parent_uuid": "a", "type": "DOC", "title": "Intro", "slug": "intro"}]"#,
        )
        .expect("valid batch");

        assert_eq!(records[0].doc_type, DocType::Section);
        assert_eq!(records[0].parent_uuid, None);
        assert_eq!(records[1].doc_type, DocType::Leaf);
        assert_eq!(records[1].parent_uuid.as_deref(), Some("a"));
        assert_eq!(records[1].slug.as_deref(), Some("intro"));
    }

    #[test]
    fn doc_type_serializes_as_section_or_leaf() {
        let record = DocumentRecord::new("a", DocType::Section, "Guide");
        let json = serde_json::to_value(&record).expect("serializable");
        assert_eq!(json["type"], "SECTION");
    }
}
