//! Statistics calculation engine.
//!
//! Pure, synchronous reducers over an in-memory [`Dataset`]:
//! - Pick scores, histograms and per-event history
//! - Per-seat game totals
//! - Win equity and raw win rate attribution
//! - Recomputation over an arbitrary event selection

pub mod attribution;
pub mod match_stats;
pub mod pick_stats;
pub mod recompute;
pub mod sequence;

pub use attribution::{compute_raw_win_rate, compute_win_equity, WinAttributionEngine};
pub use match_stats::{aggregate_events, aggregate_seat_outcomes, EventOutcomes, SeatOutcomes};
pub use pick_stats::{compute_item_stats, copy_ordinals, PickStatsAggregator};
pub use recompute::{compute_unfiltered, Dataset, RecomputeResult, SelectionRecomputer};
pub use sequence::{SelectionSequencer, SelectionTicket};
