//! The game engine: one session object per game.
//!
//! PHASES (fixed order):
//!   1. Allocating      adjust_allocation / set_allocation, then end_turn
//!   2. AwaitingChoice  only when a multi-choice life event was drawn
//!   3. ShowingResults  continue_game
//!   4. Allocating (next turn) or Finished
//!
//! RULES:
//!   - Returns resolve in asset catalog order; zero allocations draw nothing.
//!   - end_turn draws once for the event trigger and once more for the pick.
//!   - Money is clamped at 0 after every update; the broke check waits for
//!     the turn boundary.
//!   - continue_game checks win, then broke, then timeout, in that order.
//!   - All randomness flows through the injected RandomSource.
//!   - Persistence is best effort; failures are logged, never returned.

use crate::{
    command::PlayerCommand,
    config::SimConfig,
    error::{SimError, SimResult},
    event::SimEvent,
    event_catalog::LifeEvent,
    event_resolution::resolve_choice,
    outcome::{summarize, GameSummary},
    persistence::GameStore,
    presenter::{GamePresenter, NullPresenter},
    ranking::LeaderboardEntry,
    return_engine::compute_return,
    rng::{RandomSource, RngBank, RngStream},
    state::{EventRecord, GameOutcome, GamePhase, SimulationState, TurnRecord},
    store::SimStore,
    types::{EventId, Money, RunId, Turn},
};

/// Result of `end_turn` / `choose`.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnProgress {
    /// A multi-choice life event is waiting for `choose`.
    AwaitingChoice { event_id: EventId },
    /// The turn is resolved; the record is final.
    Resolved(TurnRecord),
}

/// Result of `continue_game`.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    NextTurn(Turn),
    GameOver(Box<GameSummary>),
}

/// Result of `apply`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Allocation(Money),
    Turn(TurnProgress),
    Continuation(Continuation),
}

pub struct GameEngine {
    pub run_id: RunId,
    config:     SimConfig,
    state:      SimulationState,
    rng:        Box<dyn RandomSource>,
    store:      Box<dyn GameStore>,
    presenter:  Box<dyn GamePresenter>,
    events:     Vec<SimEvent>,
    summary:    Option<GameSummary>,
}

impl GameEngine {
    /// Start a new game. Fails fast on an invalid config or unknown goal.
    pub fn new(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        goal_key: &str,
        rng: Box<dyn RandomSource>,
        store: Box<dyn GameStore>,
    ) -> SimResult<Self> {
        config.validate()?;
        if config.goal(goal_key).is_none() {
            return Err(SimError::UnknownGoal { key: goal_key.to_string() });
        }
        let state = SimulationState::new(
            run_id.clone(),
            seed,
            &config.game,
            &config.assets,
            goal_key.to_string(),
        );
        log::info!(
            "Game {run_id} started: seed={seed} goal={goal_key} money={} target={}",
            state.money,
            state.goal
        );
        let mut engine = Self {
            run_id,
            config,
            state,
            rng,
            store,
            presenter: Box::new(NullPresenter),
            events: Vec::new(),
            summary: None,
        };
        engine.emit(SimEvent::GameStarted {
            run_id:         engine.run_id.clone(),
            seed,
            goal_key:       goal_key.to_string(),
            starting_money: engine.state.money,
            goal:           engine.state.goal,
        });
        Ok(engine)
    }

    /// Build a seeded game. Call this instead of new() unless the test
    /// needs to script the draws.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        goal_key: &str,
        store: Box<dyn GameStore>,
    ) -> SimResult<Self> {
        let rng = RngBank::new(seed).for_stream(RngStream::Session);
        Self::new(run_id, seed, config, goal_key, Box::new(rng), store)
    }

    /// Seeded game on the test config with a fresh in-memory store.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Self::build(run_id, seed, SimConfig::default_test(), "bike", Box::new(store))
    }

    /// Continue a previously saved game.
    pub fn resume(
        config: SimConfig,
        mut state: SimulationState,
        store: Box<dyn GameStore>,
    ) -> SimResult<Self> {
        config.validate()?;
        for key in config.assets.keys() {
            state.allocations.entry(key.to_string()).or_insert(0);
            state.stats.assets.entry(key.to_string()).or_default();
        }
        let rng = RngBank::new(state.seed).for_resume(state.turn());
        log::info!("Game {} resumed at turn {}", state.run_id, state.turn());
        let mut engine = Self {
            run_id: state.run_id.clone(),
            config,
            state,
            rng: Box::new(rng),
            store,
            presenter: Box::new(NullPresenter),
            events: Vec::new(),
            summary: None,
        };
        engine.emit(SimEvent::GameResumed {
            run_id: engine.run_id.clone(),
            turn:   engine.state.turn(),
            money:  engine.state.money,
        });
        Ok(engine)
    }

    /// Resume whatever unfinished game the store holds. Load failures are
    /// reported as "nothing to resume".
    pub fn resume_saved(config: SimConfig, store: Box<dyn GameStore>) -> SimResult<Option<Self>> {
        match store.load_game() {
            Ok(Some(state)) if !state.is_finished() => Self::resume(config, state, store).map(Some),
            Ok(_) => Ok(None),
            Err(e) => {
                log::warn!("Could not restore saved game: {e}");
                Ok(None)
            }
        }
    }

    /// Start a fresh game with the same goal, store, and presenter.
    pub fn play_again(self, run_id: RunId, seed: u64) -> SimResult<Self> {
        let goal_key = self.state.goal_key.clone();
        let presenter = self.presenter;
        let engine = Self::build(run_id, seed, self.config, &goal_key, self.store)?;
        Ok(engine.with_presenter(presenter))
    }

    pub fn with_presenter(mut self, presenter: Box<dyn GamePresenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Replace the random source. Used by tests to script draws.
    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn money(&self) -> Money {
        self.state.money
    }

    pub fn turn(&self) -> Turn {
        self.state.turn()
    }

    pub fn phase(&self) -> &GamePhase {
        &self.state.phase
    }

    pub fn cash_remaining(&self) -> Money {
        self.state.cash_remaining()
    }

    /// The life event waiting for a choice, if any.
    pub fn pending_event(&self) -> Option<&LifeEvent> {
        match &self.state.phase {
            GamePhase::AwaitingChoice { event_id } => self.config.events.get(event_id),
            _ => None,
        }
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.state.history.last()
    }

    /// End-of-game summary once the game is finished.
    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Leaderboard as the store currently holds it. Empty if unavailable.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.store.list_leaderboard().unwrap_or_else(|e| {
            log::warn!("Could not read leaderboard: {e}");
            Vec::new()
        })
    }

    /// Up to `count` recorded games, newest first. Empty if unavailable.
    pub fn recent_runs(&self, count: usize) -> Vec<LeaderboardEntry> {
        self.store.recent_runs(count).unwrap_or_else(|e| {
            log::warn!("Could not read recent runs: {e}");
            Vec::new()
        })
    }

    /// Wipe every recorded game from the leaderboard.
    pub fn clear_leaderboard(&self) -> SimResult<()> {
        self.store.clear_leaderboard()?;
        log::info!("Leaderboard cleared");
        Ok(())
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&mut self, command: PlayerCommand) -> SimResult<Step> {
        match command {
            PlayerCommand::AdjustAllocation { asset, delta } => {
                self.adjust_allocation(&asset, delta).map(Step::Allocation)
            }
            PlayerCommand::SetAllocation { asset, amount } => {
                self.set_allocation(&asset, amount).map(Step::Allocation)
            }
            PlayerCommand::EndTurn => self.end_turn().map(Step::Turn),
            PlayerCommand::Choose { choice_index } => self.choose(choice_index).map(Step::Turn),
            PlayerCommand::Continue => self.continue_game().map(Step::Continuation),
        }
    }

    /// Move `delta` units into (or out of) `asset`. Returns the new amount.
    ///
    /// The result is clamped to [0, current + unallocated cash] and rounded
    /// to the nearest allocation step, falling back to the step below when
    /// rounding up would overspend.
    pub fn adjust_allocation(&mut self, asset: &str, delta: Money) -> SimResult<Money> {
        self.require_phase("adjust_allocation", |p| matches!(p, GamePhase::Allocating))?;
        if self.config.assets.get(asset).is_none() {
            return Err(SimError::UnknownAsset { key: asset.to_string() });
        }

        let step = self.config.game.allocation_step;
        let current = self.state.allocation(asset);
        let cap = current + self.state.cash_remaining().max(0);
        let target = current.saturating_add(delta).clamp(0, cap);
        let mut amount = round_to_step(target, step);
        if amount > cap {
            amount -= step;
        }

        if amount != current {
            self.state.allocations.insert(asset.to_string(), amount);
            self.emit(SimEvent::AllocationChanged {
                turn:  self.state.turn(),
                asset: asset.to_string(),
                amount,
            });
        }
        Ok(amount)
    }

    pub fn set_allocation(&mut self, asset: &str, amount: Money) -> SimResult<Money> {
        let current = self.state.allocation(asset);
        self.adjust_allocation(asset, amount.saturating_sub(current))
    }

    /// Resolve investments, then maybe draw a life event.
    pub fn end_turn(&mut self) -> SimResult<TurnProgress> {
        self.require_phase("end_turn", |p| matches!(p, GamePhase::Allocating))?;

        let turn = self.state.turn();
        let money_before = self.state.money;
        let allocations = self.state.allocations.clone();

        let mut returns = Vec::with_capacity(self.config.assets.len());
        for asset in self.config.assets.iter() {
            let invested = self.state.allocation(&asset.key);
            let result = compute_return(asset, invested, self.rng.as_mut());
            self.state.stats.record_return(&result);
            returns.push(result);
        }
        for r in returns.iter().filter(|r| r.invested > 0) {
            self.emit(SimEvent::AssetReturned {
                turn,
                asset:    r.asset.clone(),
                invested: r.invested,
                rate:     r.rate,
                change:   r.change,
            });
        }

        let total_change: Money = returns.iter().map(|r| r.change).sum();
        self.state.apply_money_delta(total_change);
        let money = self.state.money;
        log::debug!("turn={turn} investments: change={total_change} money={money_before}->{money}");
        self.emit(SimEvent::InvestmentsResolved { turn, total_change, money });

        self.state.history.push(TurnRecord {
            turn,
            allocations,
            returns,
            money_before,
            money_after_investments: money,
            money_after: money,
            event: None,
        });

        let roll = self.rng.next_f64();
        if roll >= self.config.game.event_probability || self.config.events.is_empty() {
            return Ok(TurnProgress::Resolved(self.finish_turn()));
        }

        let index = self.rng.pick_index(self.config.events.len());
        let Some(event) = self.config.events.by_index(index).cloned() else {
            return Ok(TurnProgress::Resolved(self.finish_turn()));
        };
        self.state.stats.events_encountered += 1;
        if let Some(record) = self.state.history.last_mut() {
            record.event = Some(EventRecord {
                event_id:     event.id.clone(),
                choice_index: None,
                choice_label: None,
                effect:       0,
                gamble:       None,
            });
        }
        log::debug!("turn={turn} life event: {} ({:?})", event.id, event.category);
        self.emit(SimEvent::LifeEventTriggered {
            turn,
            event_id: event.id.clone(),
            category: event.category,
        });
        self.presenter.on_event_ready(&event);

        if event.is_automatic() {
            return self.resolve_event(&event, 0).map(TurnProgress::Resolved);
        }
        self.set_phase(GamePhase::AwaitingChoice { event_id: event.id.clone() });
        Ok(TurnProgress::AwaitingChoice { event_id: event.id })
    }

    /// Resolve the pending life event with the player's choice.
    pub fn choose(&mut self, choice_index: usize) -> SimResult<TurnProgress> {
        let event_id = match &self.state.phase {
            GamePhase::AwaitingChoice { event_id } => event_id.clone(),
            other => return Err(self.wrong_phase("choose", other)),
        };
        let event = self
            .config
            .events
            .get(&event_id)
            .cloned()
            .ok_or(SimError::UnknownChoice { event_id, index: choice_index })?;
        self.resolve_event(&event, choice_index).map(TurnProgress::Resolved)
    }

    /// Decide whether the game goes on. Checked in order: won, broke, out
    /// of turns. Otherwise the next turn starts with empty allocations.
    pub fn continue_game(&mut self) -> SimResult<Continuation> {
        self.require_phase("continue_game", |p| matches!(p, GamePhase::ShowingResults))?;

        let outcome = if self.state.money >= self.state.goal {
            Some(GameOutcome::Won)
        } else if self.state.money <= 0 {
            Some(GameOutcome::LostBroke)
        } else if self.state.clock.is_final() {
            Some(GameOutcome::LostTimeout)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            return Ok(Continuation::GameOver(Box::new(self.end_game(outcome))));
        }

        let turn = self.state.clock.advance();
        self.state.reset_allocations();
        self.emit(SimEvent::TurnStarted { turn, money: self.state.money });
        self.set_phase(GamePhase::Allocating);

        if let Err(e) = self.store.save_game(&self.state) {
            log::warn!("Could not save game {} at turn {turn}: {e}", self.run_id);
        }
        Ok(Continuation::NextTurn(turn))
    }

    // ── Internals ──────────────────────────────────────────────

    fn resolve_event(&mut self, event: &LifeEvent, choice_index: usize) -> SimResult<TurnRecord> {
        let outcome = resolve_choice(event, choice_index, self.rng.as_mut())?;

        self.state.apply_money_delta(outcome.effect);
        for signal in &outcome.signals {
            self.state.stats.record(*signal);
        }
        if let Some(record) = self.state.history.last_mut() {
            record.event = Some(EventRecord {
                event_id:     event.id.clone(),
                choice_index: Some(choice_index),
                choice_label: event.choice(choice_index).map(|c| c.label.clone()),
                effect:       outcome.effect,
                gamble:       outcome.gamble,
            });
        }
        self.emit(SimEvent::ChoiceResolved {
            turn:         self.state.turn(),
            event_id:     event.id.clone(),
            choice_index,
            effect:       outcome.effect,
            gamble_won:   outcome.gamble.map(|g| g.won),
            money:        self.state.money,
        });
        Ok(self.finish_turn())
    }

    fn finish_turn(&mut self) -> TurnRecord {
        let money = self.state.money;
        let record = match self.state.history.last_mut() {
            Some(record) => {
                record.money_after = money;
                record.clone()
            }
            None => unreachable!("finish_turn without an open turn record"),
        };
        self.emit(SimEvent::TurnCompleted {
            turn:         record.turn,
            money_before: record.money_before,
            money_after:  record.money_after,
        });
        self.set_phase(GamePhase::ShowingResults);
        self.presenter.on_turn_result(&record);
        record
    }

    fn end_game(&mut self, outcome: GameOutcome) -> GameSummary {
        let mut summary = summarize(&self.state, &self.config.assets, outcome);

        let entry = LeaderboardEntry::from_summary(&summary, chrono::Utc::now());
        summary.rank = match self
            .store
            .append_leaderboard_entry(entry, self.config.game.leaderboard_max)
        {
            Ok(rank) => rank,
            Err(e) => {
                log::warn!("Could not record leaderboard entry for {}: {e}", self.run_id);
                None
            }
        };
        if let Err(e) = self.store.clear_game() {
            log::warn!("Could not clear saved game {}: {e}", self.run_id);
        }

        log::info!(
            "Game {} over at turn {}: {outcome:?} with {} (goal {}), rank {:?}",
            self.run_id,
            summary.turn,
            summary.final_money,
            summary.goal,
            summary.rank
        );
        self.emit(SimEvent::GameEnded {
            turn:        summary.turn,
            outcome,
            final_money: summary.final_money,
        });
        self.set_phase(GamePhase::Finished { outcome });
        self.presenter.on_game_over(&summary);
        self.summary = Some(summary.clone());
        summary
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.state.phase = phase;
        self.presenter.on_phase_change(&self.state.phase, &self.state);
    }

    fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    fn require_phase(&self, command: &'static str, allowed: fn(&GamePhase) -> bool) -> SimResult<()> {
        if allowed(&self.state.phase) {
            Ok(())
        } else {
            Err(self.wrong_phase(command, &self.state.phase))
        }
    }

    fn wrong_phase(&self, command: &'static str, phase: &GamePhase) -> SimError {
        SimError::WrongPhase {
            command,
            phase: phase.name(),
            turn:  self.state.turn(),
        }
    }
}

/// Nearest multiple of `step`, ties rounded up. `value` must be >= 0.
fn round_to_step(value: Money, step: Money) -> Money {
    (value + step / 2) / step * step
}
