use thiserror::Error;

use crate::types::Turn;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset '{key}' not found in catalog")]
    UnknownAsset { key: String },

    #[error("Event '{event_id}' has no choice {index}")]
    UnknownChoice { event_id: String, index: usize },

    #[error("Goal '{key}' not found in catalog")]
    UnknownGoal { key: String },

    #[error("Command '{command}' not allowed in phase '{phase}' (turn {turn})")]
    WrongPhase {
        command: &'static str,
        phase:   &'static str,
        turn:    Turn,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Malformed catalog entries or constants. Raised at startup, never
/// silently corrected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("asset '{key}': tier weights sum to {sum}, expected 1.0")]
    WeightsDoNotSumToOne { key: String, sum: f64 },

    #[error("asset '{key}': negative tier weight {weight}")]
    NegativeWeight { key: String, weight: f64 },

    #[error("asset '{key}': min rate {min} is greater than max rate {max}")]
    InvertedRange { key: String, min: f64, max: f64 },

    #[error("asset '{key}' is defined more than once")]
    DuplicateAsset { key: String },

    #[error("event '{id}' is defined more than once")]
    DuplicateEvent { id: String },

    #[error("event '{id}' has no choices")]
    EmptyChoices { id: String },

    #[error("event '{id}' choice {index}: win probability {p} outside [0, 1]")]
    InvalidWinProbability { id: String, index: usize, p: f64 },

    #[error("event '{id}' choice {index}: negative gamble amount")]
    NegativeGambleAmount { id: String, index: usize },

    #[error("asset catalog is empty")]
    EmptyAssetCatalog,

    #[error("event catalog is empty but event probability is {p}")]
    EmptyEventCatalog { p: f64 },

    #[error("goal catalog is empty")]
    EmptyGoalCatalog,

    #[error("game setting '{field}' is invalid: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

pub type SimResult<T> = Result<T, SimError>;
