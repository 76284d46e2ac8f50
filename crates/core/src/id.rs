//! Strongly-typed identifiers: aggregate ids and event stream ids.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Separator between a stream's category and the rest of its id.
pub const CATEGORY_SEPARATOR: char = '-';

/// Identifier of an aggregate root.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for AggregateId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for AggregateId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("AggregateId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Identifier of an append-only event stream (e.g. `InventoryItem-42`).
///
/// Streams are grouped into categories by the text before the first
/// [`CATEGORY_SEPARATOR`]. A stream id without a separator is its own category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Stream id for one entity of a category: `<category>-<entity>`.
    pub fn for_entity(category: &str, entity: impl core::fmt::Display) -> Self {
        Self(format!("{category}{CATEGORY_SEPARATOR}{entity}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category this stream belongs to.
    pub fn category(&self) -> &str {
        match self.0.split_once(CATEGORY_SEPARATOR) {
            Some((category, _)) => category,
            None => &self.0,
        }
    }

    /// Entity part of the id (after the category separator), if any.
    pub fn entity(&self) -> Option<&str> {
        self.0.split_once(CATEGORY_SEPARATOR).map(|(_, rest)| rest)
    }

    pub fn is_in_category(&self, category: &str) -> bool {
        self.category() == category
    }
}

impl core::fmt::Display for StreamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for StreamId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
