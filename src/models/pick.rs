//! Pick model: one occurrence of a card in one draft pool.

use serde::{Deserialize, Serialize};

use super::{CardKey, EventId, SeatId};

/// One occurrence of a card within one event's pool.
///
/// A card present twice in the same draft produces two `Pick` rows. The
/// order in which rows are handed to the engine is significant: see
/// [`crate::calculate::copy_ordinals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    /// Event this occurrence belongs to
    pub event_id: EventId,

    /// Seat that drafted the card (or would have owned the pool slot)
    pub seat_id: SeatId,

    /// Card name as ingested
    pub card_name: String,

    /// 1-based pick rank, meaningful only when `was_picked`
    #[serde(default)]
    pub pick_position: Option<u32>,

    /// Whether the card was taken by anyone
    pub was_picked: bool,

    /// Number of cards in the event's pool
    pub pool_size: u32,
}

impl Pick {
    /// Create a picked occurrence.
    pub fn picked(
        event_id: EventId,
        seat_id: SeatId,
        card_name: impl Into<String>,
        position: u32,
        pool_size: u32,
    ) -> Self {
        Self {
            event_id,
            seat_id,
            card_name: card_name.into(),
            pick_position: Some(position),
            was_picked: true,
            pool_size,
        }
    }

    /// Create an occurrence nobody drafted.
    pub fn unpicked(
        event_id: EventId,
        seat_id: SeatId,
        card_name: impl Into<String>,
        pool_size: u32,
    ) -> Self {
        Self {
            event_id,
            seat_id,
            card_name: card_name.into(),
            pick_position: None,
            was_picked: false,
            pool_size,
        }
    }

    /// Canonical grouping key of the card.
    pub fn key(&self) -> CardKey {
        CardKey::new(&self.card_name)
    }

    /// Position used for scoring: the pick rank when picked, otherwise the
    /// pool size (worst possible position).
    pub fn effective_position(&self) -> u32 {
        if self.was_picked {
            self.pick_position.unwrap_or(self.pool_size)
        } else {
            self.pool_size
        }
    }
}
