//! Draft event metadata.

use serde::{Deserialize, Serialize};

use super::EventId;

/// Lifecycle status of a draft event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Pool registered, drafting not started
    Upcoming,
    /// Drafting or matches in progress
    Active,
    /// All rounds reported
    #[default]
    Complete,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Upcoming => write!(f, "upcoming"),
            EventStatus::Active => write!(f, "active"),
            EventStatus::Complete => write!(f, "complete"),
        }
    }
}

/// Ordering and labeling data for one draft. Never used in scoring math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub id: EventId,

    /// Display name
    pub name: String,

    /// ISO-8601 date; lexicographic order is chronological order
    pub date: String,

    #[serde(default)]
    pub status: EventStatus,
}

impl EventMetadata {
    pub fn new(id: EventId, name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            date: date.into(),
            status: EventStatus::default(),
        }
    }
}

/// Pick the most recent event by date among `candidates`.
///
/// Dates compare lexicographically; ties resolve to the greater event id so
/// the result does not depend on iteration order. Events without metadata
/// are ignored.
pub fn latest_event<'a, I>(
    candidates: I,
    events: &'a std::collections::HashMap<EventId, EventMetadata>,
) -> Option<&'a EventMetadata>
where
    I: IntoIterator<Item = &'a EventId>,
{
    candidates
        .into_iter()
        .filter_map(|id| events.get(id))
        .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
}
