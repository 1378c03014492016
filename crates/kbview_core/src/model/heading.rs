//! In-page heading outline entry.
//!
//! # Invariants
//! - `level` is always within `1..=6`.
//! - `id` is usable as an in-page scroll anchor.

use crate::model::record::InvalidInputError;
use serde::{Deserialize, Serialize};

/// Heading rank, `h1` through `h6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn get(self) -> u8 {
        self.0
    }

    /// Parses an element tag such as `h2`. Returns `None` for non-heading tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let digits = tag.strip_prefix('h').or_else(|| tag.strip_prefix('H'))?;
        let level = digits.parse::<u8>().ok()?;
        Self::try_from(level).ok()
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = InvalidInputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=6).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidInputError::HeadingLevelOutOfRange(value))
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(value: HeadingLevel) -> Self {
        value.0
    }
}

/// One extracted heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Scroll anchor id, stable across re-extraction of the same content.
    pub id: String,
    /// Visible text, whitespace-collapsed.
    pub text: String,
    pub level: HeadingLevel,
}
