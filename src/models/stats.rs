//! Derived per-card statistics models.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{CardKey, EventId};

/// Weighted geometric mean of pick positions, or no score at all.
///
/// Serialized as a number, or `null` when unscored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum PickScore {
    Scored(f64),
    /// The card has no observed occurrences
    Unscored,
}

impl PickScore {
    /// Numeric value, with `f64::INFINITY` standing in for unscored.
    pub fn value(&self) -> f64 {
        match self {
            PickScore::Scored(v) => *v,
            PickScore::Unscored => f64::INFINITY,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, PickScore::Scored(_))
    }

    /// Ranking order: lower scores first, unscored cards last.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PickScore::Scored(a), PickScore::Scored(b)) => a.total_cmp(b),
            (PickScore::Scored(_), PickScore::Unscored) => Ordering::Less,
            (PickScore::Unscored, PickScore::Scored(_)) => Ordering::Greater,
            (PickScore::Unscored, PickScore::Unscored) => Ordering::Equal,
        }
    }
}

impl From<Option<f64>> for PickScore {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => PickScore::Scored(v),
            None => PickScore::Unscored,
        }
    }
}

impl From<PickScore> for Option<f64> {
    fn from(score: PickScore) -> Self {
        match score {
            PickScore::Scored(v) => Some(v),
            PickScore::Unscored => None,
        }
    }
}

impl std::fmt::Display for PickScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickScore::Scored(v) => write!(f, "{:.2}", v),
            PickScore::Unscored => write!(f, "new"),
        }
    }
}

/// Histogram of picked positions.
///
/// Bucket `i` covers positions `[width*i + 1, width*(i+1)]`; positions past
/// the last bucket are clamped into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickDistribution(Vec<u32>);

impl PickDistribution {
    pub fn new(bucket_count: usize) -> Self {
        Self(vec![0; bucket_count])
    }

    /// Bucket index for a position.
    pub fn bucket_for(position: u32, bucket_width: u32, bucket_count: usize) -> usize {
        let raw = (position.saturating_sub(1) / bucket_width.max(1)) as usize;
        raw.min(bucket_count.saturating_sub(1))
    }

    /// Count one picked occurrence.
    pub fn record(&mut self, position: u32, bucket_width: u32) {
        if self.0.is_empty() {
            return;
        }
        let idx = Self::bucket_for(position, bucket_width, self.0.len());
        self.0[idx] += 1;
    }

    pub fn buckets(&self) -> &[u32] {
        &self.0
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// One row of a card's per-event history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventHistoryEntry {
    /// The card appeared once in the event
    Single {
        event_id: EventId,
        date: Option<String>,
        position: u32,
        was_picked: bool,
    },
    /// Several copies appeared in the event, collapsed into one row
    Copies {
        event_id: EventId,
        date: Option<String>,
        picked_count: u32,
        total_count: u32,
        /// Best picked position, or the pool size when no copy was picked
        position: u32,
    },
}

impl EventHistoryEntry {
    pub fn event_id(&self) -> &EventId {
        match self {
            EventHistoryEntry::Single { event_id, .. } => event_id,
            EventHistoryEntry::Copies { event_id, .. } => event_id,
        }
    }

    pub fn date(&self) -> Option<&str> {
        match self {
            EventHistoryEntry::Single { date, .. } => date.as_deref(),
            EventHistoryEntry::Copies { date, .. } => date.as_deref(),
        }
    }

    /// Representative position for the event.
    pub fn position(&self) -> u32 {
        match self {
            EventHistoryEntry::Single { position, .. } => *position,
            EventHistoryEntry::Copies { position, .. } => *position,
        }
    }
}

/// Aggregated pick statistics for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Canonical key
    pub key: CardKey,

    /// Display name (first spelling seen)
    pub name: String,

    pub pick_score: PickScore,

    /// Picked occurrences
    pub total_picked: u32,

    /// All occurrences, picked or not
    pub total_available: u32,

    /// Distinct events with at least one picked occurrence
    pub events_picked_in: u32,

    /// Occurrences nobody took
    pub total_unpicked: u32,

    /// Most copies of the card seen in a single event
    pub max_copies_in_event: u32,

    /// Per-event history, oldest first
    pub history: Vec<EventHistoryEntry>,

    pub distribution: PickDistribution,
}

impl ItemStats {
    /// Placeholder row for a card with no observed occurrences.
    pub fn unscored(key: CardKey, name: impl Into<String>, bucket_count: usize) -> Self {
        Self {
            key,
            name: name.into(),
            pick_score: PickScore::Unscored,
            total_picked: 0,
            total_available: 0,
            events_picked_in: 0,
            total_unpicked: 0,
            max_copies_in_event: 0,
            history: Vec::new(),
            distribution: PickDistribution::new(bucket_count),
        }
    }

    /// Share of occurrences that were picked.
    pub fn pick_rate(&self) -> Option<f64> {
        if self.total_available == 0 {
            None
        } else {
            Some(self.total_picked as f64 / self.total_available as f64)
        }
    }

    /// Ranking order: best score first, then more picks, then key.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.pick_score
            .rank_cmp(&other.pick_score)
            .then_with(|| other.total_picked.cmp(&self.total_picked))
            .then_with(|| self.key.cmp(&other.key))
    }
}
