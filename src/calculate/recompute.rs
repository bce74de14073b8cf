//! Recomputation over an arbitrary subset of events.
//!
//! Selecting every event must reproduce [`compute_unfiltered`] exactly:
//! filtering keeps the original pick order and events are always visited
//! in id order, so both paths perform the same floating-point operations
//! even though the unfiltered path calls the aggregators directly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use super::attribution::{compute_raw_win_rate, compute_win_equity, WinAttributionEngine};
use super::match_stats::{aggregate_events, aggregate_seat_outcomes, EventOutcomes};
use super::pick_stats::{compute_item_stats, PickStatsAggregator};
use crate::config::{AttributionConfig, ScoringConfig};
use crate::models::{
    latest_event, AttributionTable, CardKey, EventId, EventMetadata, ItemMetadata, ItemStats,
    MatchRecord, Pick,
};

/// In-memory snapshot of everything the engine consumes.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Pick rows in ingestion order
    pub picks: Vec<Pick>,
    pub events: HashMap<EventId, EventMetadata>,
    pub matches: HashMap<EventId, Vec<MatchRecord>>,
    pub cards: HashMap<CardKey, ItemMetadata>,
    /// Registered card list per event, when known
    pub pools: HashMap<EventId, Vec<String>>,
}

impl Dataset {
    /// Every event id referenced anywhere in the snapshot.
    pub fn event_ids(&self) -> BTreeSet<EventId> {
        self.picks
            .iter()
            .map(|p| p.event_id.clone())
            .chain(self.events.keys().cloned())
            .chain(self.matches.keys().cloned())
            .chain(self.pools.keys().cloned())
            .collect()
    }
}

/// Everything a consumer needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecomputeResult {
    /// Ranked card statistics
    pub item_stats: Vec<ItemStats>,
    /// Play-probability attribution
    pub win_equity: AttributionTable,
    /// Uniform attribution
    pub raw_win_rate: AttributionTable,
    /// Most recent event in the selection
    pub latest_event: Option<EventId>,
    /// Copies of each card in the latest event's pool
    pub copy_counts: BTreeMap<CardKey, u32>,
}

impl RecomputeResult {
    /// Stats row for a card name.
    pub fn item(&self, name: &str) -> Option<&ItemStats> {
        let key = CardKey::new(name);
        self.item_stats.iter().find(|s| s.key == key)
    }
}

/// Runs every aggregator over a chosen subset of a dataset.
pub struct SelectionRecomputer<'a> {
    dataset: &'a Dataset,
    scoring: &'a ScoringConfig,
    attribution: &'a AttributionConfig,
}

impl<'a> SelectionRecomputer<'a> {
    pub fn new(
        dataset: &'a Dataset,
        scoring: &'a ScoringConfig,
        attribution: &'a AttributionConfig,
    ) -> Self {
        Self {
            dataset,
            scoring,
            attribution,
        }
    }

    /// Recompute for every event in the dataset.
    pub fn recompute_all(&self) -> RecomputeResult {
        self.recompute(&self.dataset.event_ids())
    }

    /// Recompute for the selected events. Unknown ids are ignored.
    pub fn recompute(&self, selected: &BTreeSet<EventId>) -> RecomputeResult {
        let known = self.dataset.event_ids();
        let unknown = selected.difference(&known).count();
        if unknown > 0 {
            warn!("Ignoring {} selected event ids not present in the dataset", unknown);
        }

        let picks: Vec<Pick> = self
            .dataset
            .picks
            .iter()
            .filter(|p| selected.contains(&p.event_id))
            .cloned()
            .collect();

        debug!(
            "Recomputing {} of {} events ({} picks)",
            selected.len() - unknown,
            known.len(),
            picks.len()
        );

        assemble(self.dataset, &picks, selected, self.scoring, self.attribution)
    }
}

/// Compute directly over the whole dataset, with no event filter.
///
/// Every aggregator runs on the raw snapshot: all pick rows and the seat
/// outcomes of every event with match records.
pub fn compute_unfiltered(
    dataset: &Dataset,
    scoring: &ScoringConfig,
    attribution: &AttributionConfig,
) -> RecomputeResult {
    let mut outcomes = EventOutcomes::new();
    for (event_id, records) in &dataset.matches {
        outcomes.insert(event_id.clone(), aggregate_seat_outcomes(records));
    }
    let win_equity = compute_win_equity(&outcomes, &dataset.picks, &dataset.cards, attribution);
    let raw_win_rate =
        compute_raw_win_rate(&outcomes, &dataset.picks, &dataset.cards, attribution);

    let item_stats = compute_item_stats(&dataset.picks, &dataset.events, scoring);
    let latest = latest_event(dataset.events.keys(), &dataset.events).map(|e| e.id.clone());

    finish(
        dataset,
        &dataset.picks,
        latest,
        item_stats,
        win_equity,
        raw_win_rate,
        scoring,
    )
}

fn assemble(
    dataset: &Dataset,
    picks: &[Pick],
    event_ids: &BTreeSet<EventId>,
    scoring: &ScoringConfig,
    attribution: &AttributionConfig,
) -> RecomputeResult {
    let outcomes = aggregate_events(event_ids, &dataset.matches);
    let engine = WinAttributionEngine::new(attribution, &dataset.cards);
    let win_equity = engine.win_equity(&outcomes, picks);
    let raw_win_rate = engine.raw_win_rate(&outcomes, picks);

    let item_stats = PickStatsAggregator::new(scoring, &dataset.events).compute(picks);
    let latest = latest_event(event_ids, &dataset.events).map(|e| e.id.clone());

    finish(
        dataset,
        picks,
        latest,
        item_stats,
        win_equity,
        raw_win_rate,
        scoring,
    )
}

/// Attach latest-pool copy counts and pad unobserved pool cards.
fn finish(
    dataset: &Dataset,
    picks: &[Pick],
    latest: Option<EventId>,
    mut item_stats: Vec<ItemStats>,
    win_equity: AttributionTable,
    raw_win_rate: AttributionTable,
    scoring: &ScoringConfig,
) -> RecomputeResult {
    let (copy_counts, names) = match &latest {
        Some(id) => latest_pool(dataset, picks, id),
        None => (BTreeMap::new(), HashMap::new()),
    };

    // Cards in the current pool with no observations still need a row.
    let present: BTreeSet<CardKey> = item_stats.iter().map(|s| s.key.clone()).collect();
    let missing: Vec<ItemStats> = copy_counts
        .keys()
        .filter(|key| !present.contains(*key))
        .map(|key| {
            let name = names.get(key).cloned().unwrap_or_else(|| key.to_string());
            ItemStats::unscored(key.clone(), name, scoring.bucket_count)
        })
        .collect();
    if !missing.is_empty() {
        debug!("Adding {} unscored cards from the latest pool", missing.len());
        item_stats.extend(missing);
        item_stats.sort_by(|a, b| a.rank_cmp(b));
    }

    RecomputeResult {
        item_stats,
        win_equity,
        raw_win_rate,
        latest_event: latest,
        copy_counts,
    }
}

/// Copy counts (and display names) for the latest event's pool.
///
/// A registered card list takes precedence over the event's pick rows.
fn latest_pool(
    dataset: &Dataset,
    picks: &[Pick],
    latest: &EventId,
) -> (BTreeMap<CardKey, u32>, HashMap<CardKey, String>) {
    let names: Vec<&str> = match dataset.pools.get(latest) {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => picks
            .iter()
            .filter(|p| &p.event_id == latest)
            .map(|p| p.card_name.as_str())
            .collect(),
    };

    let mut counts = BTreeMap::new();
    let mut display = HashMap::new();
    for name in names {
        let key = CardKey::new(name);
        *counts.entry(key.clone()).or_insert(0) += 1;
        display
            .entry(key)
            .or_insert_with(|| name.trim().to_string());
    }
    (counts, display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PickScore, SeatId};
    use pretty_assertions::assert_eq;

    fn event(id: &str, date: &str) -> (EventId, EventMetadata) {
        (
            EventId::from(id),
            EventMetadata::new(id.into(), format!("Draft {}", id), date),
        )
    }

    fn sample_dataset() -> Dataset {
        let picks = vec![
            Pick::picked("d1".into(), "alice".into(), "Lightning Bolt", 1, 45),
            Pick::picked("d1".into(), "alice".into(), "Island", 30, 45),
            Pick::picked("d1".into(), "bob".into(), "Island", 12, 45),
            Pick::picked("d1".into(), "bob".into(), "Counterspell", 2, 45),
            Pick::unpicked("d1".into(), "bob".into(), "Ponder", 45),
            Pick::picked("d2".into(), "alice".into(), "Counterspell", 5, 45),
            Pick::picked("d2".into(), "carol".into(), "lightning bolt", 3, 45),
            Pick::picked("d2".into(), "carol".into(), "Ponder", 33, 45),
            Pick::picked("d3".into(), "bob".into(), "Island", 8, 45),
            Pick::unpicked("d3".into(), "bob".into(), "Counterspell", 45),
        ];

        let events = [
            event("d1", "2024-01-10"),
            event("d2", "2024-02-14"),
            event("d3", "2024-03-20"),
        ]
        .into_iter()
        .collect();

        let mut matches = HashMap::new();
        matches.insert(
            EventId::from("d1"),
            vec![MatchRecord::new("d1".into(), 1, "alice".into(), "bob".into(), 2, 1)],
        );
        matches.insert(
            EventId::from("d2"),
            vec![
                MatchRecord::new("d2".into(), 1, "alice".into(), "carol".into(), 0, 2),
                MatchRecord::bye("d2".into(), 2, "alice".into(), 2),
            ],
        );

        let mut cards = HashMap::new();
        let island = ItemMetadata::new("Island").with_type_line("Basic Land — Island");
        cards.insert(island.key(), island);

        Dataset {
            picks,
            events,
            matches,
            cards,
            pools: HashMap::new(),
        }
    }

    fn select(ids: &[&str]) -> BTreeSet<EventId> {
        ids.iter().map(|id| EventId::from(*id)).collect()
    }

    /// Six events with rotated seats, mixed-case names, unpicked rows,
    /// byes, one event without results and a registered pool.
    fn generated_dataset() -> Dataset {
        const CARDS: [&str; 12] = [
            "Lightning Bolt",
            "Counterspell",
            "Island",
            "Mountain",
            "Ponder",
            "Brainstorm",
            "Opt",
            "Preordain",
            "Snapcaster Mage",
            "Fire // Ice",
            "Swords to Plowshares",
            "Plains",
        ];
        const SEATS: [&str; 5] = ["alice", "bob", "carol", "dave", "erin"];

        let mut dataset = Dataset::default();
        for e in 0..6u32 {
            let event_id = EventId::from(format!("ev{}", e));
            // months deliberately out of id order; ev4 is the latest
            let date = format!("2024-{:02}-{:02}", 1 + (e * 5) % 7, 1 + e);
            dataset.events.insert(
                event_id.clone(),
                EventMetadata::new(event_id.clone(), format!("Draft {}", e), date),
            );

            for i in 0..40u32 {
                let seat = SeatId::from(SEATS[((i * 3 + e) % 5) as usize]);
                let name = CARDS[((i * 7 + e * 5) % 12) as usize];
                let name = if i % 5 == 0 {
                    name.to_uppercase()
                } else {
                    name.to_string()
                };
                let pick = if (i + e) % 6 == 0 {
                    Pick::unpicked(event_id.clone(), seat, name, 45)
                } else {
                    Pick::picked(event_id.clone(), seat, name, 1 + (i * 11 + e * 3) % 45, 45)
                };
                dataset.picks.push(pick);
            }

            if e == 4 {
                continue;
            }
            let mut records = Vec::new();
            for round in 1..=3u32 {
                for k in 0..2u32 {
                    let a = SEATS[((k * 2 + round + e) % 5) as usize];
                    let b = SEATS[((k * 2 + 1 + round + e) % 5) as usize];
                    let (won_a, won_b) = match (round + k + e) % 3 {
                        0 => (2, 0),
                        1 => (2, 1),
                        _ => (1, 2),
                    };
                    records.push(MatchRecord::new(
                        event_id.clone(),
                        round,
                        a.into(),
                        b.into(),
                        won_a,
                        won_b,
                    ));
                }
                let bye = SEATS[((4 + round + e) % 5) as usize];
                records.push(MatchRecord::bye(event_id.clone(), round, bye.into(), 2));
            }
            dataset.matches.insert(event_id, records);
        }

        for name in ["Island", "Mountain", "Plains"] {
            let card = ItemMetadata::new(name).with_type_line(format!("Basic Land — {}", name));
            dataset.cards.insert(card.key(), card);
        }
        dataset.pools.insert(
            EventId::from("ev4"),
            vec![
                "Island".to_string(),
                "Island".to_string(),
                "Ponder".to_string(),
                "Force of Will".to_string(),
            ],
        );
        dataset
    }

    /// Copy of `dataset` holding only the given events.
    fn restrict(dataset: &Dataset, ids: &BTreeSet<EventId>) -> Dataset {
        Dataset {
            picks: dataset
                .picks
                .iter()
                .filter(|p| ids.contains(&p.event_id))
                .cloned()
                .collect(),
            events: dataset
                .events
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, e)| (id.clone(), e.clone()))
                .collect(),
            matches: dataset
                .matches
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, m)| (id.clone(), m.clone()))
                .collect(),
            cards: dataset.cards.clone(),
            pools: dataset
                .pools
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, p)| (id.clone(), p.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_select_all_matches_unfiltered() {
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();

        for dataset in [sample_dataset(), generated_dataset()] {
            let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);
            let direct = compute_unfiltered(&dataset, &scoring, &attribution);

            let all: BTreeSet<EventId> = dataset.events.keys().cloned().collect();
            assert_eq!(recomputer.recompute(&all), direct);
            assert_eq!(recomputer.recompute_all(), direct);
        }
    }

    #[test]
    fn test_generated_dataset_unfiltered_shape() {
        let dataset = generated_dataset();
        let result = compute_unfiltered(
            &dataset,
            &ScoringConfig::default(),
            &AttributionConfig::default(),
        );

        assert_eq!(result.latest_event, Some(EventId::from("ev4")));
        assert_eq!(result.copy_counts[&CardKey::new("island")], 2);
        let force = result.item("Force of Will").unwrap();
        assert_eq!(force.pick_score, PickScore::Unscored);
        assert_eq!(result.item_stats.last().unwrap().key, force.key);

        // every picked occurrence and every row is accounted for
        let available: u32 = result.item_stats.iter().map(|s| s.total_available).sum();
        assert_eq!(available as usize, dataset.picks.len());
        assert!(!result.win_equity.is_empty());
        assert_eq!(
            result.win_equity.keys().collect::<Vec<_>>(),
            result.raw_win_rate.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_subset_matches_unfiltered_restricted_dataset() {
        let dataset = generated_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);

        for ids in [
            &["ev1", "ev3"][..],
            &["ev0", "ev2", "ev5"][..],
            &["ev4"][..],
            &["ev2", "ev4"][..],
        ] {
            let selection = select(ids);
            let restricted = restrict(&dataset, &selection);
            assert_eq!(
                recomputer.recompute(&selection),
                compute_unfiltered(&restricted, &scoring, &attribution)
            );
        }
    }

    #[test]
    fn test_subset_only_uses_selected_events() {
        let dataset = sample_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);

        let result = recomputer.recompute(&select(&["d2"]));

        let bolt = result.item("Lightning Bolt").unwrap();
        assert_eq!(bolt.total_picked, 1);
        assert!(bolt.pick_score.is_scored());
        assert!((bolt.pick_score.value() - 3.0).abs() < 1e-12);
        assert!(result.item("Island").is_none());

        // alice went 2-2 in d2 with a single picked card
        let counterspell = result.raw_win_rate[&CardKey::new("Counterspell")];
        assert_eq!(counterspell.wins, 2.0);
        assert_eq!(counterspell.losses, 2.0);
        assert_eq!(result.latest_event, Some(EventId::from("d2")));
    }

    #[test]
    fn test_copy_counts_from_latest_event_picks() {
        let dataset = sample_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);

        let result = recomputer.recompute(&select(&["d1", "d2"]));

        assert_eq!(result.latest_event, Some(EventId::from("d2")));
        assert_eq!(result.copy_counts.len(), 3);
        assert_eq!(result.copy_counts[&CardKey::new("lightning bolt")], 1);

        let d1 = recomputer.recompute(&select(&["d1"]));
        assert_eq!(d1.copy_counts[&CardKey::new("island")], 2);
    }

    #[test]
    fn test_registered_pool_adds_unscored_cards() {
        let mut dataset = sample_dataset();
        dataset.pools.insert(
            EventId::from("d3"),
            vec![
                "Island".to_string(),
                "Island".to_string(),
                "Brainstorm".to_string(),
            ],
        );
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);

        let result = recomputer.recompute_all();

        assert_eq!(result.copy_counts[&CardKey::new("island")], 2);
        let brainstorm = result.item("brainstorm").unwrap();
        assert_eq!(brainstorm.name, "Brainstorm");
        assert_eq!(brainstorm.pick_score, PickScore::Unscored);
        assert_eq!(brainstorm.total_available, 0);
        assert!(brainstorm.history.is_empty());
        assert_eq!(result.item_stats.last().unwrap().key, brainstorm.key);
        assert!(!result.win_equity.contains_key(&brainstorm.key));
        assert!(!result.raw_win_rate.contains_key(&brainstorm.key));

        assert_eq!(result, compute_unfiltered(&dataset, &scoring, &attribution));
    }

    #[test]
    fn test_unknown_and_empty_selection() {
        let dataset = sample_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);

        let result = recomputer.recompute(&select(&["nope"]));
        assert!(result.item_stats.is_empty());
        assert!(result.win_equity.is_empty());
        assert!(result.latest_event.is_none());
        assert!(result.copy_counts.is_empty());

        assert_eq!(recomputer.recompute(&BTreeSet::new()), result);
    }

    #[test]
    fn test_attribution_sums_match_games() {
        let dataset = sample_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let result = compute_unfiltered(&dataset, &scoring, &attribution);

        // d1: alice 2-1, bob 1-2; d2: alice 2-2, carol 2-0
        for table in [&result.win_equity, &result.raw_win_rate] {
            let wins: f64 = table.values().map(|r| r.wins).sum();
            let losses: f64 = table.values().map(|r| r.losses).sum();
            assert!((wins - 7.0).abs() < 1e-9);
            assert!((losses - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_recompute_idempotent() {
        let dataset = sample_dataset();
        let scoring = ScoringConfig::default();
        let attribution = AttributionConfig::default();
        let recomputer = SelectionRecomputer::new(&dataset, &scoring, &attribution);
        let selection = select(&["d1", "d3"]);

        assert_eq!(recomputer.recompute(&selection), recomputer.recompute(&selection));
    }
}
