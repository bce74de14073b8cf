//! Per-seat game totals from round results.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{EventId, MatchRecord, SeatId, SeatOutcome};

/// Seat outcomes of one event, ordered by seat.
pub type SeatOutcomes = BTreeMap<SeatId, SeatOutcome>;

/// Seat outcomes for several events, ordered by event.
pub type EventOutcomes = BTreeMap<EventId, SeatOutcomes>;

/// Sum games won and lost per seat across every round of one event.
///
/// Records are expected to belong to a single event. An empty slice yields
/// an empty map.
pub fn aggregate_seat_outcomes(matches: &[MatchRecord]) -> SeatOutcomes {
    let mut outcomes = SeatOutcomes::new();

    for record in matches {
        let a = outcomes.entry(record.seat_a.clone()).or_default();
        a.games_won += record.games_won_a;
        a.games_lost += record.games_won_b;

        if let Some(seat_b) = &record.seat_b {
            let b = outcomes.entry(seat_b.clone()).or_default();
            b.games_won += record.games_won_b;
            b.games_lost += record.games_won_a;
        }
    }

    outcomes
}

/// Aggregate each listed event separately.
///
/// Events with no match records, or whose seats all have empty totals, are
/// left out of the result.
pub fn aggregate_events<'a, I>(
    event_ids: I,
    matches: &HashMap<EventId, Vec<MatchRecord>>,
) -> EventOutcomes
where
    I: IntoIterator<Item = &'a EventId>,
{
    let mut result = EventOutcomes::new();

    for event_id in event_ids {
        let Some(records) = matches.get(event_id) else {
            continue;
        };
        let outcomes = aggregate_seat_outcomes(records);
        if outcomes.values().all(SeatOutcome::is_empty) {
            continue;
        }
        debug!(
            "Event {}: {} seats with results from {} rounds",
            event_id,
            outcomes.len(),
            records.len()
        );
        result.insert(event_id.clone(), outcomes);
    }

    result
}
