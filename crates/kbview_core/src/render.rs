//! Realized content tree handed over by the rendering collaborator.
//!
//! # Responsibility
//! - Model the rendered document as elements and text runs.
//! - Classify collapsible/auxiliary regions for outline extraction.
//!
//! # Invariants
//! - Children keep document order.
//! - Visible text is whitespace-collapsed and trimmed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One child of a rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderedNode {
    Text(String),
    Element(RenderedElement),
}

/// How an element participates in the visible outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Collapsed-by-default container (`details`).
    Collapsible,
    /// Visible label of a collapsible container (`summary`).
    Label,
    /// Side content that never contributes to the outline.
    Auxiliary,
    Plain,
}

/// One rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<RenderedNode>,
}

impl RenderedElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends one child element.
    pub fn child(mut self, element: RenderedElement) -> Self {
        self.children.push(RenderedNode::Element(element));
        self
    }

    /// Appends one text run.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(RenderedNode::Text(text.into()));
        self
    }

    /// Classifies this element for outline purposes.
    pub fn region_kind(&self) -> RegionKind {
        if self.attributes.contains_key("hidden")
            || self.attributes.get("aria-hidden").map(String::as_str) == Some("true")
        {
            return RegionKind::Auxiliary;
        }
        match self.tag.to_ascii_lowercase().as_str() {
            "details" => RegionKind::Collapsible,
            "summary" => RegionKind::Label,
            "aside" | "nav" => RegionKind::Auxiliary,
            _ => RegionKind::Plain,
        }
    }

    /// Concatenated descendant text, whitespace-collapsed.
    pub fn visible_text(&self) -> String {
        let mut raw = String::new();
        let mut stack: Vec<&RenderedNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                RenderedNode::Text(text) => raw.push_str(text),
                RenderedNode::Element(element) => {
                    stack.extend(element.children.iter().rev());
                }
            }
        }
        WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
    }

    /// Every non-blank id carried by this element or its descendants.
    pub fn collect_ids(&self) -> HashSet<String> {
        let mut ids = HashSet::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            if let Some(id) = element.id.as_deref().map(str::trim) {
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
            stack.extend(element.children.iter().filter_map(|node| match node {
                RenderedNode::Element(child) => Some(child),
                RenderedNode::Text(_) => None,
            }));
        }
        ids
    }
}
