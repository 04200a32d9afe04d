//! The engine event log.
//!
//! RULE: every state transition the engine makes is recorded here.
//! Two engines with the same seed fed the same commands must produce
//! identical logs.

use crate::{
    event_catalog::EventCategory,
    state::GameOutcome,
    types::{AssetKey, EventId, GoalKey, Money, RunId, Turn},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during a game.
/// Variants are only ever appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Lifecycle ──────────────────────────────────
    GameStarted {
        run_id:         RunId,
        seed:           u64,
        goal_key:       GoalKey,
        starting_money: Money,
        goal:           Money,
    },
    GameResumed {
        run_id: RunId,
        turn:   Turn,
        money:  Money,
    },
    TurnStarted {
        turn:  Turn,
        money: Money,
    },

    // ── Allocation ─────────────────────────────────
    AllocationChanged {
        turn:   Turn,
        asset:  AssetKey,
        amount: Money,
    },

    // ── Resolution ─────────────────────────────────
    AssetReturned {
        turn:     Turn,
        asset:    AssetKey,
        invested: Money,
        rate:     f64,
        change:   Money,
    },
    InvestmentsResolved {
        turn:         Turn,
        total_change: Money,
        money:        Money,
    },
    LifeEventTriggered {
        turn:     Turn,
        event_id: EventId,
        category: EventCategory,
    },
    ChoiceResolved {
        turn:         Turn,
        event_id:     EventId,
        choice_index: usize,
        effect:       Money,
        gamble_won:   Option<bool>,
        money:        Money,
    },
    TurnCompleted {
        turn:         Turn,
        money_before: Money,
        money_after:  Money,
    },

    // ── End of game ────────────────────────────────
    GameEnded {
        turn:        Turn,
        outcome:     GameOutcome,
        final_money: Money,
    },
}

impl SimEvent {
    /// Stable name used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GameStarted { .. }         => "game_started",
            Self::GameResumed { .. }         => "game_resumed",
            Self::TurnStarted { .. }         => "turn_started",
            Self::AllocationChanged { .. }   => "allocation_changed",
            Self::AssetReturned { .. }       => "asset_returned",
            Self::InvestmentsResolved { .. } => "investments_resolved",
            Self::LifeEventTriggered { .. }  => "life_event_triggered",
            Self::ChoiceResolved { .. }      => "choice_resolved",
            Self::TurnCompleted { .. }       => "turn_completed",
            Self::GameEnded { .. }           => "game_ended",
        }
    }

    /// Turn the event belongs to; lifecycle events before play use 0.
    pub fn turn(&self) -> Turn {
        match self {
            Self::GameStarted { .. } => 0,
            Self::GameResumed { turn, .. }
            | Self::TurnStarted { turn, .. }
            | Self::AllocationChanged { turn, .. }
            | Self::AssetReturned { turn, .. }
            | Self::InvestmentsResolved { turn, .. }
            | Self::LifeEventTriggered { turn, .. }
            | Self::ChoiceResolved { turn, .. }
            | Self::TurnCompleted { turn, .. }
            | Self::GameEnded { turn, .. } => *turn,
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub turn:       Turn,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn from_event(run_id: &str, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id:         None,
            run_id:     run_id.to_string(),
            turn:       event.turn(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }
}
