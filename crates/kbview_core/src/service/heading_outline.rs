//! In-page heading outline use-case.
//!
//! # Responsibility
//! - Collect visible headings of rendered content in document order.
//! - Assign scroll anchor ids and persist them onto the elements.
//!
//! # Invariants
//! - Hidden headings and headings inside collapsible or auxiliary regions are
//!   skipped, except a heading inside a collapsible region's visible label.
//! - Headings with blank visible text are skipped.
//! - An existing id is reused; otherwise `<prefix>-<index>` is synthesized from
//!   the index among extracted headings, with a `-<n>` suffix on collision.
//! - Ids are unique within one pass and identical across passes over
//!   unmodified content.
//!
//! The caller runs extraction only once content is fully rendered.

use crate::model::heading::{HeadingEntry, HeadingLevel};
use crate::render::{RegionKind, RenderedElement, RenderedNode};
use log::debug;
use std::collections::HashSet;

/// Default prefix for synthesized anchor ids.
pub const DEFAULT_HEADING_ID_PREFIX: &str = "heading";

/// Heading outline extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingExtractor {
    id_prefix: String,
}

impl Default for HeadingExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_ID_PREFIX)
    }
}

impl HeadingExtractor {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
        }
    }

    /// Extracts the outline and writes assigned ids back onto `root`.
    pub fn extract(&self, root: &mut RenderedElement) -> Vec<HeadingEntry> {
        let mut pass = ExtractionPass {
            prefix: self.id_prefix.as_str(),
            reserved: root.collect_ids(),
            claimed: HashSet::new(),
            entries: Vec::new(),
            synthesized: 0,
        };
        pass.visit(root, false);

        debug!(
            "event=heading_outline_extracted module=service headings={} synthesized_ids={}",
            pass.entries.len(),
            pass.synthesized
        );
        pass.entries
    }
}

/// Extracts the outline with the default id prefix.
pub fn extract_headings(root: &mut RenderedElement) -> Vec<HeadingEntry> {
    HeadingExtractor::default().extract(root)
}

struct ExtractionPass<'p> {
    prefix: &'p str,
    /// Ids present anywhere in the content before this pass.
    reserved: HashSet<String>,
    /// Ids handed out to headings during this pass.
    claimed: HashSet<String>,
    entries: Vec<HeadingEntry>,
    synthesized: usize,
}

impl ExtractionPass<'_> {
    fn visit(&mut self, element: &mut RenderedElement, excluded: bool) {
        if let Some(level) = HeadingLevel::from_tag(&element.tag) {
            if !excluded && element.region_kind() != RegionKind::Auxiliary {
                self.record_heading(element, level);
            }
            return;
        }

        let region = element.region_kind();
        for child in element.children.iter_mut() {
            let RenderedNode::Element(child) = child else {
                continue;
            };
            let child_excluded = match region {
                RegionKind::Auxiliary => true,
                RegionKind::Collapsible => {
                    excluded || child.region_kind() != RegionKind::Label
                }
                RegionKind::Label | RegionKind::Plain => excluded,
            };
            self.visit(child, child_excluded);
        }
    }

    fn record_heading(&mut self, element: &mut RenderedElement, level: HeadingLevel) {
        let text = element.visible_text();
        if text.is_empty() {
            return;
        }
        let id = self.assign_id(element);
        self.entries.push(HeadingEntry { id, text, level });
    }

    fn assign_id(&mut self, element: &mut RenderedElement) -> String {
        let existing = element
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if let Some(existing) = existing {
            if self.claimed.insert(existing.clone()) {
                element.id = Some(existing.clone());
                return existing;
            }
        }

        let base = format!("{}-{}", self.prefix, self.entries.len());
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.reserved.contains(&candidate) || self.claimed.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }

        self.claimed.insert(candidate.clone());
        self.reserved.insert(candidate.clone());
        self.synthesized += 1;
        element.id = Some(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_headings, HeadingExtractor};
    use crate::render::{RenderedElement, RenderedNode};

    fn ids(root: &mut RenderedElement) -> Vec<String> {
        extract_headings(root).into_iter().map(|entry| entry.id).collect()
    }

    #[test]
    fn index_counts_extracted_headings_only() {
        let mut root = RenderedElement::new("article")
            .child(RenderedElement::new("h1").text("Title"))
            .child(RenderedElement::new("h2").text("   "))
            .child(
                RenderedElement::new("aside").child(RenderedElement::new("h3").text("Side note")),
            )
            .child(RenderedElement::new("h2").text("Usage"));

        assert_eq!(ids(&mut root), vec!["heading-0", "heading-1"]);
    }

    #[test]
    fn summary_heading_is_kept_but_collapsed_body_is_not() {
        let mut root = RenderedElement::new("article").child(
            RenderedElement::new("details")
                .child(RenderedElement::new("summary").child(RenderedElement::new("h3").text("FAQ")))
                .child(RenderedElement::new("h3").text("Hidden answer")),
        );

        let entries = extract_headings(&mut root);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "FAQ");
        assert_eq!(entries[0].level.get(), 3);
    }

    #[test]
    fn nested_collapsible_label_stays_excluded() {
        let mut root = RenderedElement::new("details").child(
            RenderedElement::new("div").child(
                RenderedElement::new("details").child(
                    RenderedElement::new("summary").child(RenderedElement::new("h4").text("Inner")),
                ),
            ),
        );
        assert!(extract_headings(&mut root).is_empty());
    }

    #[test]
    fn existing_ids_are_reused_and_collisions_suffixed() {
        let mut root = RenderedElement::new("article")
            .child(RenderedElement::new("p").with_id("heading-1"))
            .child(RenderedElement::new("h2").with_id("install").text("Install"))
            .child(RenderedElement::new("h2").text("Configure"))
            .child(RenderedElement::new("h2").with_id("install").text("Install again"));

        assert_eq!(
            ids(&mut root),
            vec!["install", "heading-1-1", "heading-2"]
        );
    }

    #[test]
    fn custom_prefix_is_used() {
        let mut root = RenderedElement::new("article").child(RenderedElement::new("h1").text("A"));
        let entries = HeadingExtractor::new("toc").extract(&mut root);
        assert_eq!(entries[0].id, "toc-0");
    }

    #[test]
    fn padded_existing_id_is_persisted_trimmed() {
        let mut root = RenderedElement::new("article")
            .child(RenderedElement::new("h2").with_id(" intro ").text("Intro"));

        assert_eq!(ids(&mut root), vec!["intro"]);
        let RenderedNode::Element(heading) = &root.children[0] else {
            panic!("heading element expected");
        };
        assert_eq!(heading.id.as_deref(), Some("intro"));
    }

    #[test]
    fn hidden_heading_is_skipped() {
        let mut root = RenderedElement::new("article")
            .child(
                RenderedElement::new("h2")
                    .with_attribute("aria-hidden", "true")
                    .text("Screen-reader duplicate"),
            )
            .child(RenderedElement::new("h2").text("Visible"));

        assert_eq!(ids(&mut root), vec!["heading-0"]);
    }
}
