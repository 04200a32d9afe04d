//! Simulation state for one game, owned by the engine.
//!
//! Everything here is plain data and serializes as the save-game body.
//! Mutation rules live in engine.rs.

use crate::{
    asset_catalog::AssetCatalog,
    clock::TurnClock,
    config::GameConfig,
    event_resolution::{BehaviorSignal, GambleOutcome},
    return_engine::InvestmentReturn,
    types::{AssetKey, EventId, GoalKey, Money, RunId, Turn},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Won,
    LostBroke,
    LostTimeout,
}

impl GameOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Won)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    Allocating,
    AwaitingChoice { event_id: EventId },
    ShowingResults,
    Finished { outcome: GameOutcome },
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Allocating          => "allocating",
            Self::AwaitingChoice { .. } => "awaiting_choice",
            Self::ShowingResults      => "showing_results",
            Self::Finished { .. }     => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetStats {
    pub invested: Money,
    pub returns:  Money,
}

impl AssetStats {
    /// Cumulative return over cumulative invested. None if never invested.
    pub fn roi(&self) -> Option<f64> {
        (self.invested > 0).then(|| self.returns as f64 / self.invested as f64)
    }
}

/// Cumulative behaviour and performance counters for the whole game.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub assets:             BTreeMap<AssetKey, AssetStats>,
    pub events_encountered: u32,
    pub fomo_resisted:      u32,
    pub fomo_gave_in:       u32,
    pub scams_avoided:      u32,
    pub scams_fell_for:     u32,
    pub gambles_taken:      u32,
    pub gambles_won:        u32,
    pub lowest_money:       Money,
}

impl Stats {
    pub fn new(catalog: &AssetCatalog, starting_money: Money) -> Self {
        Self {
            assets: catalog.keys().map(|k| (k.to_string(), AssetStats::default())).collect(),
            lowest_money: starting_money,
            ..Self::default()
        }
    }

    pub fn asset(&self, key: &str) -> AssetStats {
        self.assets.get(key).copied().unwrap_or_default()
    }

    pub fn record_return(&mut self, result: &InvestmentReturn) {
        let entry = self.assets.entry(result.asset.clone()).or_default();
        entry.invested += result.invested;
        entry.returns += result.change;
    }

    pub fn record(&mut self, signal: BehaviorSignal) {
        let counter = match signal {
            BehaviorSignal::FomoResisted => &mut self.fomo_resisted,
            BehaviorSignal::FomoGaveIn   => &mut self.fomo_gave_in,
            BehaviorSignal::ScamAvoided  => &mut self.scams_avoided,
            BehaviorSignal::ScamFellFor  => &mut self.scams_fell_for,
            BehaviorSignal::GambleTaken  => &mut self.gambles_taken,
            BehaviorSignal::GambleWon    => &mut self.gambles_won,
        };
        *counter += 1;
    }

    pub fn observe_money(&mut self, money: Money) {
        self.lowest_money = self.lowest_money.min(money);
    }
}

/// The life event taken during a turn and how it resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub event_id:     EventId,
    pub choice_index: Option<usize>,
    pub choice_label: Option<String>,
    pub effect:       Money,
    pub gamble:       Option<GambleOutcome>,
}

/// Audit record of one completed (or in-flight) turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnRecord {
    pub turn:                    Turn,
    pub allocations:             BTreeMap<AssetKey, Money>,
    pub returns:                 Vec<InvestmentReturn>,
    pub money_before:            Money,
    pub money_after_investments: Money,
    pub money_after:             Money,
    pub event:                   Option<EventRecord>,
}

impl TurnRecord {
    pub fn investment_change(&self) -> Money {
        self.returns.iter().map(|r| r.change).sum()
    }

    pub fn event_effect(&self) -> Money {
        self.event.as_ref().map_or(0, |e| e.effect)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    pub run_id:      RunId,
    pub seed:        u64,
    pub clock:       TurnClock,
    pub money:       Money,
    pub goal:        Money,
    pub goal_key:    GoalKey,
    pub phase:       GamePhase,
    pub allocations: BTreeMap<AssetKey, Money>,
    pub stats:       Stats,
    pub history:     Vec<TurnRecord>,
}

impl SimulationState {
    pub fn new(
        run_id: RunId,
        seed: u64,
        game: &GameConfig,
        catalog: &AssetCatalog,
        goal_key: GoalKey,
    ) -> Self {
        Self {
            run_id,
            seed,
            clock: TurnClock::new(game.max_turns),
            money: game.starting_money,
            goal: game.goal_amount,
            goal_key,
            phase: GamePhase::Allocating,
            allocations: catalog.keys().map(|k| (k.to_string(), 0)).collect(),
            stats: Stats::new(catalog, game.starting_money),
            history: Vec::new(),
        }
    }

    pub fn turn(&self) -> Turn {
        self.clock.current_turn
    }

    pub fn allocation(&self, key: &str) -> Money {
        self.allocations.get(key).copied().unwrap_or(0)
    }

    pub fn allocated_total(&self) -> Money {
        self.allocations.values().sum()
    }

    /// Cash not yet placed in any asset this turn.
    pub fn cash_remaining(&self) -> Money {
        self.money - self.allocated_total()
    }

    pub fn reset_allocations(&mut self) {
        self.allocations.values_mut().for_each(|v| *v = 0);
    }

    /// Apply a signed delta to money, clamping at the zero floor.
    pub fn apply_money_delta(&mut self, delta: Money) {
        self.money = self.money.saturating_add(delta).max(0);
        self.stats.observe_money(self.money);
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }
}
