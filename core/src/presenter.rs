//! Presentation hooks.
//!
//! RULE: the engine never renders anything. It reports phase changes and
//! results through this trait; every hook defaults to a no-op.

use crate::{
    event_catalog::LifeEvent,
    outcome::GameSummary,
    state::{GamePhase, SimulationState, TurnRecord},
};

pub trait GamePresenter {
    /// Called after every phase transition.
    fn on_phase_change(&mut self, _phase: &GamePhase, _state: &SimulationState) {}

    /// A life event was drawn. For multi-choice events the engine then
    /// waits for `GameEngine::choose`.
    fn on_event_ready(&mut self, _event: &LifeEvent) {}

    /// The turn is fully resolved: investment results, money before and
    /// after, and the event effect are all on the record.
    fn on_turn_result(&mut self, _record: &TurnRecord) {}

    fn on_game_over(&mut self, _summary: &GameSummary) {}
}

/// Presenter that ignores everything. Used by headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl GamePresenter for NullPresenter {}
