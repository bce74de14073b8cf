//! Win/loss credit attributed to cards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CardKey;

/// Accumulated game credit for one card under one attribution model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub wins: f64,
    pub losses: f64,
    /// wins / (wins + losses)
    pub win_rate: f64,
}

impl AttributionResult {
    /// Build a result from totals. Returns `None` when no games were credited.
    pub fn from_totals(wins: f64, losses: f64) -> Option<Self> {
        let games = wins + losses;
        if games > 0.0 {
            Some(Self {
                wins,
                losses,
                win_rate: wins / games,
            })
        } else {
            None
        }
    }

    /// Fractional games credited.
    pub fn games(&self) -> f64 {
        self.wins + self.losses
    }
}

/// Per-card attribution results for one model, ordered by key.
pub type AttributionTable = BTreeMap<CardKey, AttributionResult>;
