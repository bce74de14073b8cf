//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pick score weighting and histogram shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight multiplier per additional copy in the same event
    #[serde(default = "default_copy_decay")]
    pub copy_decay: f64,

    /// Weight of an occurrence nobody picked
    #[serde(default = "default_unpicked_weight")]
    pub unpicked_weight: f64,

    /// Positions per distribution bucket
    #[serde(default = "default_bucket_width")]
    pub bucket_width: u32,

    /// Number of distribution buckets
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,
}

fn default_copy_decay() -> f64 {
    0.5
}

fn default_unpicked_weight() -> f64 {
    0.5
}

fn default_bucket_width() -> u32 {
    30
}

fn default_bucket_count() -> usize {
    15
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            copy_decay: default_copy_decay(),
            unpicked_weight: default_unpicked_weight(),
            bucket_width: default_bucket_width(),
            bucket_count: default_bucket_count(),
        }
    }
}

impl ScoringConfig {
    /// Weight of the `ordinal`-th copy (1-based) within one event.
    pub fn copy_weight(&self, ordinal: u32) -> f64 {
        self.copy_decay.powi(ordinal.saturating_sub(1) as i32)
    }

    /// Weight applied for the picked flag.
    pub fn picked_weight(&self, was_picked: bool) -> f64 {
        if was_picked {
            1.0
        } else {
            self.unpicked_weight
        }
    }
}

/// One step of the play-probability table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTier {
    /// Inclusive upper bound of pick positions in this tier
    pub max_position: u32,
    pub probability: f64,
}

/// Play-probability heuristic used by the win equity model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_land_probability")]
    pub land_probability: f64,

    /// Probability past the last tier
    #[serde(default = "default_tail_probability")]
    pub tail_probability: f64,

    /// Tiers ordered by `max_position`
    #[serde(default = "default_tiers")]
    pub tiers: Vec<ProbabilityTier>,
}

fn default_land_probability() -> f64 {
    1.0
}

fn default_tiers() -> Vec<ProbabilityTier> {
    vec![
        ProbabilityTier {
            max_position: 15,
            probability: 0.95,
        },
        ProbabilityTier {
            max_position: 23,
            probability: 0.80,
        },
        ProbabilityTier {
            max_position: 30,
            probability: 0.40,
        },
    ]
}

fn default_tail_probability() -> f64 {
    0.10
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            land_probability: default_land_probability(),
            tail_probability: default_tail_probability(),
            tiers: default_tiers(),
        }
    }
}

impl AttributionConfig {
    /// Estimated chance a card taken at `position` made it into the deck.
    pub fn play_probability(&self, position: u32, is_land: bool) -> f64 {
        if is_land {
            return self.land_probability;
        }
        self.tiers
            .iter()
            .find(|tier| position <= tier.max_position)
            .map(|tier| tier.probability)
            .unwrap_or(self.tail_probability)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub attribution: AttributionConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringConfig::default(),
            attribution: AttributionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;
        if !(scoring.copy_decay > 0.0 && scoring.copy_decay <= 1.0) {
            return Err(ConfigError::ValidationError(
                "copy_decay must be in (0, 1]".to_string(),
            ));
        }

        if !(scoring.unpicked_weight > 0.0 && scoring.unpicked_weight <= 1.0) {
            return Err(ConfigError::ValidationError(
                "unpicked_weight must be in (0, 1]".to_string(),
            ));
        }

        if scoring.bucket_width == 0 || scoring.bucket_count == 0 {
            return Err(ConfigError::ValidationError(
                "Distribution buckets must have non-zero width and count".to_string(),
            ));
        }

        let attribution = &self.attribution;
        let probabilities = attribution
            .tiers
            .iter()
            .map(|t| t.probability)
            .chain([attribution.land_probability, attribution.tail_probability]);
        for p in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::ValidationError(format!(
                    "Play probability {} is outside [0, 1]",
                    p
                )));
            }
        }

        for pair in attribution.tiers.windows(2) {
            if pair[1].max_position <= pair[0].max_position {
                return Err(ConfigError::ValidationError(
                    "Probability tiers must have strictly increasing max_position".to_string(),
                ));
            }
        }

        Ok(())
    }
}
