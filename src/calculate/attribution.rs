//! Win attribution from seat results back to the cards a seat drafted.
//!
//! Two models share the same iteration over (event, seat) pairs and differ
//! only in how a seat's games are split across its picked cards:
//!
//! - **Win equity**: proportional to each card's play probability.
//! - **Raw win rate**: equal share for every picked card.
//!
//! Both are rough signals on small samples and are reported as such.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::match_stats::EventOutcomes;
use crate::config::AttributionConfig;
use crate::models::{
    AttributionResult, AttributionTable, CardKey, EventId, ItemMetadata, Pick, SeatId,
};

/// Picked cards per (event, seat), in input order.
fn picked_by_seat(picks: &[Pick]) -> HashMap<(&EventId, &SeatId), Vec<&Pick>> {
    let mut pools: HashMap<(&EventId, &SeatId), Vec<&Pick>> = HashMap::new();
    for pick in picks.iter().filter(|p| p.was_picked) {
        pools
            .entry((&pick.event_id, &pick.seat_id))
            .or_default()
            .push(pick);
    }
    pools
}

/// Distributes seat results onto picked cards.
pub struct WinAttributionEngine<'a> {
    config: &'a AttributionConfig,
    cards: &'a HashMap<CardKey, ItemMetadata>,
}

impl<'a> WinAttributionEngine<'a> {
    /// `cards` is optional enrichment; a card without an entry is a non-land.
    pub fn new(config: &'a AttributionConfig, cards: &'a HashMap<CardKey, ItemMetadata>) -> Self {
        Self { config, cards }
    }

    fn is_land(&self, key: &CardKey) -> bool {
        self.cards
            .get(key)
            .map(ItemMetadata::resolved_is_land)
            .unwrap_or(false)
    }

    /// Play probability of a picked card.
    pub fn play_probability(&self, pick: &Pick) -> f64 {
        self.config
            .play_probability(pick.effective_position(), self.is_land(&pick.key()))
    }

    /// Split each seat's games across its picks in proportion to play probability.
    pub fn win_equity(&self, outcomes: &EventOutcomes, picks: &[Pick]) -> AttributionTable {
        let table = distribute(outcomes, picks, |pool| {
            let probabilities: Vec<f64> = pool.iter().map(|p| self.play_probability(p)).collect();
            let total: f64 = probabilities.iter().sum();
            if total > 0.0 {
                Some(probabilities.into_iter().map(|p| p / total).collect())
            } else {
                None
            }
        });
        debug!("Win equity attributed to {} cards", table.len());
        table
    }

    /// Split each seat's games evenly across its picks.
    pub fn raw_win_rate(&self, outcomes: &EventOutcomes, picks: &[Pick]) -> AttributionTable {
        let table = distribute(outcomes, picks, |pool| {
            if pool.is_empty() {
                return None;
            }
            let share = 1.0 / pool.len() as f64;
            Some(vec![share; pool.len()])
        });
        debug!("Raw win rate attributed to {} cards", table.len());
        table
    }
}

/// Shared accumulation for both models.
///
/// `shares` maps a seat's picked pool to one fraction per card, or `None`
/// to skip the seat. Seats with empty outcomes or no picks are skipped.
fn distribute<F>(outcomes: &EventOutcomes, picks: &[Pick], shares: F) -> AttributionTable
where
    F: Fn(&[&Pick]) -> Option<Vec<f64>>,
{
    let pools = picked_by_seat(picks);
    let mut totals: BTreeMap<CardKey, (f64, f64)> = BTreeMap::new();

    for (event_id, seats) in outcomes {
        for (seat_id, outcome) in seats {
            if outcome.is_empty() {
                continue;
            }
            let Some(pool) = pools.get(&(event_id, seat_id)) else {
                continue;
            };
            let Some(fractions) = shares(pool.as_slice()) else {
                continue;
            };

            let won = outcome.games_won as f64;
            let lost = outcome.games_lost as f64;
            for (pick, fraction) in pool.iter().zip(fractions) {
                let entry = totals.entry(pick.key()).or_insert((0.0, 0.0));
                entry.0 += won * fraction;
                entry.1 += lost * fraction;
            }
        }
    }

    totals
        .into_iter()
        .filter_map(|(key, (wins, losses))| {
            AttributionResult::from_totals(wins, losses).map(|result| (key, result))
        })
        .collect()
}

/// Win equity with a throwaway engine.
pub fn compute_win_equity(
    outcomes: &EventOutcomes,
    picks: &[Pick],
    cards: &HashMap<CardKey, ItemMetadata>,
    config: &AttributionConfig,
) -> AttributionTable {
    WinAttributionEngine::new(config, cards).win_equity(outcomes, picks)
}

/// Raw win rate with a throwaway engine.
pub fn compute_raw_win_rate(
    outcomes: &EventOutcomes,
    picks: &[Pick],
    cards: &HashMap<CardKey, ItemMetadata>,
    config: &AttributionConfig,
) -> AttributionTable {
    WinAttributionEngine::new(config, cards).raw_win_rate(outcomes, picks)
}
