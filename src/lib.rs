//! # Draft Ledger
//!
//! Pick scoring and win attribution for cards drafted across many events.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (picks, events, pairings, card stats)
//! - **calculate**: Pick scores, seat outcomes, win attribution, selection recompute
//! - **storage**: JSONL snapshot loading from the data directory
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;

use std::collections::BTreeSet;

/// Parse a comma-separated event list (e.g., "d1, d2,d3").
///
/// Returns `None` for an empty list, meaning "every event".
pub fn parse_event_list(s: &str) -> Option<BTreeSet<EventId>> {
    let ids: BTreeSet<EventId> = s
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(EventId::from)
        .collect();

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
