//! Pairing model: per-round match results between two seats.

use serde::{Deserialize, Serialize};

use super::{EventId, SeatId};

/// Result of one round between two seats of the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Event this pairing belongs to
    pub event_id: EventId,

    /// Round number
    pub round: u32,

    /// First seat
    pub seat_a: SeatId,

    /// Second seat; `None` for a bye
    #[serde(default)]
    pub seat_b: Option<SeatId>,

    /// Games won by seat A
    pub games_won_a: u32,

    /// Games won by seat B
    pub games_won_b: u32,
}

impl MatchRecord {
    /// Create a pairing between two seats.
    pub fn new(
        event_id: EventId,
        round: u32,
        seat_a: SeatId,
        seat_b: SeatId,
        games_won_a: u32,
        games_won_b: u32,
    ) -> Self {
        Self {
            event_id,
            round,
            seat_a,
            seat_b: Some(seat_b),
            games_won_a,
            games_won_b,
        }
    }

    /// Create a bye for a seat.
    pub fn bye(event_id: EventId, round: u32, seat: SeatId, games_won: u32) -> Self {
        Self {
            event_id,
            round,
            seat_a: seat,
            seat_b: None,
            games_won_a: games_won,
            games_won_b: 0,
        }
    }
}

/// Game totals of one seat across every round of one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatOutcome {
    pub games_won: u32,
    pub games_lost: u32,
}

impl SeatOutcome {
    /// Total games played.
    pub fn games(&self) -> u32 {
        self.games_won + self.games_lost
    }

    /// True when the seat has no reported games.
    pub fn is_empty(&self) -> bool {
        self.games() == 0
    }
}
