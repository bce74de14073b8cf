//! Pick score aggregation.
//!
//! Each occurrence of a card contributes `copy_weight * picked_weight` to a
//! weighted geometric mean of its positions:
//!
//! ```text
//! score = exp( sum(w_i * ln(pos_i)) / sum(w_i) )
//! ```
//!
//! Unpicked occurrences count at the event's pool size with reduced weight.

use std::collections::HashMap;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::models::{
    CardKey, EventHistoryEntry, EventId, EventMetadata, ItemStats, Pick, PickDistribution,
    PickScore,
};

/// Assign each pick its 1-based copy ordinal within (event, card).
///
/// Ordinals follow slice order, not position: the first row for a card in
/// an event is copy 1 and receives full weight. Callers must pass picks in
/// ingestion order.
pub fn copy_ordinals(picks: &[Pick]) -> Vec<u32> {
    let mut seen: HashMap<(&EventId, CardKey), u32> = HashMap::new();
    picks
        .iter()
        .map(|pick| {
            let count = seen.entry((&pick.event_id, pick.key())).or_insert(0);
            *count += 1;
            *count
        })
        .collect()
}

/// Occurrences of one card within one event, in input order.
struct EventGroup<'a> {
    event_id: &'a EventId,
    occurrences: Vec<&'a Pick>,
}

impl EventGroup<'_> {
    fn picked_count(&self) -> u32 {
        self.occurrences.iter().filter(|p| p.was_picked).count() as u32
    }

    fn history_entry(&self, date: Option<String>) -> EventHistoryEntry {
        let event_id = self.event_id.clone();
        if let [only] = self.occurrences.as_slice() {
            return EventHistoryEntry::Single {
                event_id,
                date,
                position: only.effective_position(),
                was_picked: only.was_picked,
            };
        }

        let best_picked = self
            .occurrences
            .iter()
            .filter(|p| p.was_picked)
            .map(|p| p.effective_position())
            .min();
        let position = match best_picked {
            Some(pos) => pos,
            None => self.occurrences[0].pool_size,
        };

        EventHistoryEntry::Copies {
            event_id,
            date,
            picked_count: self.picked_count(),
            total_count: self.occurrences.len() as u32,
            position,
        }
    }
}

struct ItemAccumulator<'a> {
    name: &'a str,
    weighted_log_sum: f64,
    weight_sum: f64,
    total_picked: u32,
    total_unpicked: u32,
    distribution: PickDistribution,
    groups: Vec<EventGroup<'a>>,
    group_index: HashMap<&'a EventId, usize>,
}

impl<'a> ItemAccumulator<'a> {
    fn new(name: &'a str, bucket_count: usize) -> Self {
        Self {
            name,
            weighted_log_sum: 0.0,
            weight_sum: 0.0,
            total_picked: 0,
            total_unpicked: 0,
            distribution: PickDistribution::new(bucket_count),
            groups: Vec::new(),
            group_index: HashMap::new(),
        }
    }

    fn add(&mut self, pick: &'a Pick, ordinal: u32, config: &ScoringConfig) {
        let weight = config.copy_weight(ordinal) * config.picked_weight(pick.was_picked);
        let position = pick.effective_position();

        self.weighted_log_sum += weight * (position as f64).ln();
        self.weight_sum += weight;

        if pick.was_picked {
            self.total_picked += 1;
            self.distribution.record(position, config.bucket_width);
        } else {
            self.total_unpicked += 1;
        }

        let idx = *self.group_index.entry(&pick.event_id).or_insert_with(|| {
            self.groups.push(EventGroup {
                event_id: &pick.event_id,
                occurrences: Vec::new(),
            });
            self.groups.len() - 1
        });
        self.groups[idx].occurrences.push(pick);
    }

    fn finish(
        self,
        key: CardKey,
        events: &HashMap<EventId, EventMetadata>,
    ) -> ItemStats {
        let pick_score = if self.weight_sum > 0.0 {
            PickScore::Scored((self.weighted_log_sum / self.weight_sum).exp())
        } else {
            PickScore::Unscored
        };

        let events_picked_in = self.groups.iter().filter(|g| g.picked_count() > 0).count() as u32;
        let max_copies_in_event = self
            .groups
            .iter()
            .map(|g| g.occurrences.len() as u32)
            .max()
            .unwrap_or(0);

        let mut history: Vec<EventHistoryEntry> = self
            .groups
            .iter()
            .map(|g| g.history_entry(events.get(g.event_id).map(|e| e.date.clone())))
            .collect();
        // Undated events sort after dated ones; ties keep first-appearance order.
        history.sort_by(|a, b| match (a.date(), b.date()) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        ItemStats {
            key,
            name: self.name.trim().to_string(),
            pick_score,
            total_picked: self.total_picked,
            total_available: self.total_picked + self.total_unpicked,
            events_picked_in,
            total_unpicked: self.total_unpicked,
            max_copies_in_event,
            history,
            distribution: self.distribution,
        }
    }
}

/// Reduces pick rows into per-card statistics.
pub struct PickStatsAggregator<'a> {
    config: &'a ScoringConfig,
    events: &'a HashMap<EventId, EventMetadata>,
}

impl<'a> PickStatsAggregator<'a> {
    /// `events` supplies history dates only; it never affects scores.
    pub fn new(config: &'a ScoringConfig, events: &'a HashMap<EventId, EventMetadata>) -> Self {
        Self { config, events }
    }

    /// Compute stats for every card in `picks`, ranked best first.
    ///
    /// Output depends on the order of `picks` through [`copy_ordinals`].
    pub fn compute(&self, picks: &[Pick]) -> Vec<ItemStats> {
        let ordinals = copy_ordinals(picks);
        let mut items: HashMap<CardKey, ItemAccumulator<'_>> = HashMap::new();

        for (pick, ordinal) in picks.iter().zip(ordinals) {
            items
                .entry(pick.key())
                .or_insert_with(|| ItemAccumulator::new(&pick.card_name, self.config.bucket_count))
                .add(pick, ordinal, self.config);
        }

        let mut stats: Vec<ItemStats> = items
            .into_iter()
            .map(|(key, acc)| acc.finish(key, self.events))
            .collect();
        stats.sort_by(|a, b| a.rank_cmp(b));

        debug!("Computed pick stats for {} cards from {} picks", stats.len(), picks.len());
        stats
    }
}

/// Convenience wrapper around [`PickStatsAggregator::compute`].
pub fn compute_item_stats(
    picks: &[Pick],
    events: &HashMap<EventId, EventMetadata>,
    config: &ScoringConfig,
) -> Vec<ItemStats> {
    PickStatsAggregator::new(config, events).compute(picks)
}
