//! Assemble an in-memory [`Dataset`] from the data directory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{EntityType, JsonlReader, StorageConfig, StorageError};
use crate::calculate::Dataset;
use crate::models::{EventId, EventMetadata, ItemMetadata, MatchRecord, Pick};

/// Registered card list for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub event_id: EventId,
    pub cards: Vec<String>,
}

/// Read every entity file into a [`Dataset`].
///
/// Pick rows are read strictly: a malformed line is an error rather than a
/// skipped row, since dropping one would shift copy ordinals. Other files
/// skip bad lines. Missing files read as empty, except `picks.jsonl`.
pub fn load_dataset(config: &StorageConfig) -> Result<Dataset, StorageError> {
    let picks = JsonlReader::<Pick>::for_entity(config, EntityType::Pick)
        .iter()?
        .collect::<Result<Vec<_>, _>>()?;

    let events: HashMap<EventId, EventMetadata> =
        JsonlReader::<EventMetadata>::for_entity(config, EntityType::Event)
            .read_all()?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

    let mut matches: HashMap<EventId, Vec<MatchRecord>> = HashMap::new();
    for record in JsonlReader::<MatchRecord>::for_entity(config, EntityType::Match).read_all()? {
        matches
            .entry(record.event_id.clone())
            .or_default()
            .push(record);
    }

    let cards = JsonlReader::<ItemMetadata>::for_entity(config, EntityType::Card)
        .read_all()?
        .into_iter()
        .map(|c| (c.key(), c))
        .collect();

    let mut pools: HashMap<EventId, Vec<String>> = HashMap::new();
    for record in JsonlReader::<PoolRecord>::for_entity(config, EntityType::Pool).read_all()? {
        pools.entry(record.event_id).or_default().extend(record.cards);
    }

    info!(
        "Loaded {} picks across {} events ({} with match results)",
        picks.len(),
        events.len(),
        matches.len()
    );

    Ok(Dataset {
        picks,
        events,
        matches,
        cards,
        pools,
    })
}
