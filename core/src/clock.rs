//! Turn clock: owns the month counter and the turn limit.

use crate::types::Turn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnClock {
    pub current_turn: Turn,
    pub max_turns:    Turn,
}

impl TurnClock {
    /// A fresh clock starts on turn 1.
    pub fn new(max_turns: Turn) -> Self {
        Self { current_turn: 1, max_turns }
    }

    /// Advance one turn. Returns the new turn number.
    /// Panics if called on the final turn; callers check `is_final()`.
    pub fn advance(&mut self) -> Turn {
        assert!(!self.is_final(), "advance() called on final turn");
        self.current_turn += 1;
        self.current_turn
    }

    pub fn is_final(&self) -> bool {
        self.current_turn >= self.max_turns
    }
}
