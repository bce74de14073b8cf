//! Identifiers and the canonical card key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identifier assigned by the ingestion layer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new EntityId.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type alias for event (draft) IDs
pub type EventId = EntityId;

/// Type alias for seat IDs. Seats are only unique within one event.
pub type SeatId = EntityId;

/// Grouping key for a card: case-folded and whitespace-trimmed name.
///
/// Every aggregation in the engine groups by this key, so "Lightning Bolt"
/// and "lightning bolt " are the same card.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardKey(String);

impl CardKey {
    /// Build the canonical key for a raw card name.
    pub fn new(name: &str) -> Self {
        Self(canonical_key(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardKey({})", self.0)
    }
}

impl From<&str> for CardKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Normalize a card name into its grouping key.
pub fn canonical_key(name: &str) -> String {
    name.trim().to_lowercase()
}
