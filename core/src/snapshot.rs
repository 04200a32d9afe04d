//! Save-game snapshot: the full simulation state as JSON.
//!
//! A snapshot is written at the start of every turn after the first.
//! It captures everything needed to resume the game from that turn.

use crate::{
    state::SimulationState,
    types::{RunId, Turn},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bump when SimulationState changes shape. Older saves are discarded.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub version:  u32,
    pub run_id:   RunId,
    pub turn:     Turn,
    pub saved_at: DateTime<Utc>,
    pub state:    SimulationState,
}

impl SaveSnapshot {
    pub fn capture(state: &SimulationState, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SAVE_VERSION,
            run_id: state.run_id.clone(),
            turn: state.turn(),
            saved_at,
            state: state.clone(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == SAVE_VERSION
    }
}
