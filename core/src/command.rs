use crate::types::{AssetKey, Money};
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants are only ever appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Allocation phase ──────────────────────────
    AdjustAllocation {
        asset: AssetKey,
        delta: Money,
    },
    SetAllocation {
        asset:  AssetKey,
        amount: Money,
    },
    EndTurn,

    // ── Event phase ───────────────────────────────
    Choose {
        choice_index: usize,
    },

    // ── Results phase ─────────────────────────────
    Continue,
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdjustAllocation { .. } => "adjust_allocation",
            Self::SetAllocation { .. }    => "set_allocation",
            Self::EndTurn                 => "end_turn",
            Self::Choose { .. }           => "choose",
            Self::Continue                => "continue",
        }
    }
}
