//! Flat record contracts and batch decoding.
//!
//! # Responsibility
//! - Describe identity/parent linkage shared by every tree-shaped record.
//! - Turn one backend JSON array into typed records or an `InvalidInputError`.
//!
//! # Invariants
//! - Decoding never partially succeeds: one bad element rejects the batch.
//! - Linkage problems (dangling or cyclic ids) are NOT decode errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// One entity from a backend list response, positioned by identity fields.
pub trait FlatRecord {
    /// Identity type, unique within one fetch batch.
    type Id: Clone + Eq + Hash + Debug;

    /// Returns this record's identity.
    fn record_id(&self) -> &Self::Id;

    /// Returns the declared parent identity, `None` for root-level records.
    fn parent_id(&self) -> Option<&Self::Id>;
}

/// Flat record that also carries a "previous sibling" ordering hint.
pub trait SiblingLinked: FlatRecord {
    /// Identity of the sibling that should precede this record.
    fn previous_sibling_id(&self) -> Option<&Self::Id>;
}

/// Backend batch category, used for error reporting and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Documents,
    Comments,
    Feed,
}

impl BatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Comments => "comments",
            Self::Feed => "feed",
        }
    }
}

impl Display for BatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input that is well-formed JSON of the wrong shape, or violates a field contract.
#[derive(Debug)]
pub enum InvalidInputError {
    /// Payload is not a JSON array of the expected record type.
    Malformed {
        batch: BatchKind,
        source: serde_json::Error,
    },
    /// Required identifier field is blank after trim.
    BlankIdentifier {
        batch: BatchKind,
        index: usize,
        field: &'static str,
    },
    /// Heading level is outside `1..=6`.
    HeadingLevelOutOfRange(u8),
}

impl Display for InvalidInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { batch, source } => {
                write!(f, "invalid {batch} payload: {source}")
            }
            Self::BlankIdentifier {
                batch,
                index,
                field,
            } => write!(f, "invalid {batch} payload: `{field}` is blank at index {index}"),
            Self::HeadingLevelOutOfRange(level) => {
                write!(f, "heading level must be within 1..=6, got {level}")
            }
        }
    }
}

impl Error for InvalidInputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            Self::BlankIdentifier { .. } => None,
            Self::HeadingLevelOutOfRange(_) => None,
        }
    }
}

/// Record type that can arrive as one element of a backend batch.
pub trait BatchRecord: DeserializeOwned {
    /// Batch category reported in errors.
    const KIND: BatchKind;

    /// Returns the name of the first required identifier field that is blank.
    fn blank_identifier(&self) -> Option<&'static str> {
        None
    }
}

/// Decodes one backend JSON array into typed records.
///
/// # Errors
/// - `Malformed` when the payload is not an array of `T` (wrong field types included).
/// - `BlankIdentifier` when an element carries an empty identity.
pub fn decode_batch<T: BatchRecord>(json: &str) -> Result<Vec<T>, InvalidInputError> {
    let records: Vec<T> =
        serde_json::from_str(json).map_err(|source| InvalidInputError::Malformed {
            batch: T::KIND,
            source,
        })?;

    for (index, record) in records.iter().enumerate() {
        if let Some(field) = record.blank_identifier() {
            return Err(InvalidInputError::BlankIdentifier {
                batch: T::KIND,
                index,
                field,
            });
        }
    }

    Ok(records)
}

/// Deserializes an optional string reference, mapping `""` to `None`.
///
/// The backend uses an empty string for "no parent" on top-level entries.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|inner| !inner.trim().is_empty()))
}
