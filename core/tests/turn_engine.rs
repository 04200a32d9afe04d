//! Turn engine: phase machine, money flow, and end-of-game priority.

use longgame_core::{
    config::SimConfig,
    engine::{Continuation, GameEngine, TurnProgress},
    error::SimError,
    event::SimEvent,
    rng::SequenceRng,
    state::{GameOutcome, GamePhase, SimulationState},
    store::SimStore,
};

const EVENT_COUNT: f64 = 17.0;

/// Draw that makes `pick_index` land on catalog position `index`.
fn pick(index: usize) -> f64 {
    (index as f64 + 0.5) / EVENT_COUNT
}

fn make_engine(draws: Vec<f64>) -> GameEngine {
    GameEngine::build_test("turn-test".into(), 7)
        .unwrap()
        .with_rng(Box::new(SequenceRng::new(draws)))
}

/// Engine resumed from a hand-built state at `turn` with `money`.
fn make_engine_at(turn: u32, money: i64, draws: Vec<f64>) -> GameEngine {
    let config = SimConfig::default_test();
    let mut state = SimulationState::new("turn-test".into(), 7, &config.game, &config.assets, "bike".into());
    state.clock.current_turn = turn;
    state.money = money;
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    GameEngine::resume(config, state, Box::new(store))
        .unwrap()
        .with_rng(Box::new(SequenceRng::new(draws)))
}

fn expect_results(progress: TurnProgress) -> longgame_core::state::TurnRecord {
    match progress {
        TurnProgress::Resolved(record) => record,
        other => panic!("expected a resolved turn, got {other:?}"),
    }
}

#[test]
fn new_game_starts_allocating_on_turn_one() {
    let engine = make_engine(vec![]);
    assert_eq!(engine.turn(), 1);
    assert_eq!(engine.money(), 100);
    assert_eq!(engine.state().goal, 500);
    assert_eq!(engine.phase(), &GamePhase::Allocating);
    assert!(engine.state().allocations.values().all(|&v| v == 0));
}

#[test]
fn safe_allocation_grows_money_and_resets_next_turn() {
    // Low tier at its floor (2%), then no event.
    let mut engine = make_engine(vec![0.0, 0.0, 0.99]);
    assert_eq!(engine.set_allocation("shelly", 50).unwrap(), 50);

    let record = expect_results(engine.end_turn().unwrap());
    assert_eq!(record.money_before, 100);
    assert_eq!(record.money_after, 101, "50 at +2% should add 1");
    assert_eq!(record.investment_change(), 1);
    assert!(record.event.is_none());
    assert_eq!(engine.phase(), &GamePhase::ShowingResults);
    assert_eq!(engine.state().stats.asset("shelly").invested, 50);
    assert_eq!(engine.state().stats.asset("shelly").returns, 1);

    assert_eq!(engine.continue_game().unwrap(), Continuation::NextTurn(2));
    assert_eq!(engine.money(), 101);
    assert_eq!(engine.phase(), &GamePhase::Allocating);
    assert!(
        engine.state().allocations.values().all(|&v| v == 0),
        "allocations must reset at the start of each turn"
    );
}

#[test]
fn automatic_event_resolves_inside_end_turn() {
    // Event triggers, picks found_money (+5).
    let mut engine = make_engine(vec![0.0, pick(0)]);
    let record = expect_results(engine.end_turn().unwrap());
    let event = record.event.expect("event should be recorded");
    assert_eq!(event.event_id, "found_money");
    assert_eq!(event.choice_index, Some(0));
    assert_eq!(event.effect, 5);
    assert_eq!(engine.money(), 105);
    assert_eq!(engine.state().stats.events_encountered, 1);
}

#[test]
fn multi_choice_event_waits_for_choose() {
    let mut engine = make_engine(vec![0.0, pick(8)]);
    assert_eq!(
        engine.end_turn().unwrap(),
        TurnProgress::AwaitingChoice { event_id: "new_game".into() }
    );
    assert_eq!(engine.pending_event().map(|e| e.id.as_str()), Some("new_game"));

    let record = expect_results(engine.choose(1).unwrap());
    assert_eq!(record.money_after, 100);
    assert_eq!(engine.state().stats.fomo_resisted, 1);
    assert_eq!(engine.state().stats.fomo_gave_in, 0);
    assert!(engine.pending_event().is_none());
}

#[test]
fn bad_choice_index_leaves_event_pending() {
    let mut engine = make_engine(vec![0.0, pick(8)]);
    engine.end_turn().unwrap();
    let err = engine.choose(5).unwrap_err();
    assert!(matches!(err, SimError::UnknownChoice { index: 5, .. }), "got {err:?}");
    assert!(matches!(engine.phase(), GamePhase::AwaitingChoice { .. }));
    assert_eq!(engine.money(), 100);
}

#[test]
fn commands_in_wrong_phase_are_rejected_without_side_effects() {
    let mut engine = make_engine(vec![0.99]);

    assert!(matches!(engine.choose(0), Err(SimError::WrongPhase { command: "choose", .. })));
    assert!(matches!(
        engine.continue_game(),
        Err(SimError::WrongPhase { command: "continue_game", phase: "allocating", .. })
    ));

    engine.end_turn().unwrap();
    let history_len = engine.state().history.len();
    assert!(matches!(engine.end_turn(), Err(SimError::WrongPhase { command: "end_turn", .. })));
    assert!(matches!(
        engine.adjust_allocation("shelly", 10),
        Err(SimError::WrongPhase { phase: "showing_results", .. })
    ));
    assert_eq!(engine.state().history.len(), history_len, "rejected end_turn must not add a turn");
    assert_eq!(engine.money(), 100);
}

#[test]
fn reaching_goal_wins_immediately() {
    // 495 + found_money (5) on turn 3.
    let mut engine = make_engine_at(3, 495, vec![0.0, pick(0)]);
    engine.end_turn().unwrap();
    match engine.continue_game().unwrap() {
        Continuation::GameOver(summary) => {
            assert_eq!(summary.outcome, GameOutcome::Won);
            assert_eq!(summary.turn, 3);
            assert_eq!(summary.final_money, 500);
        }
        other => panic!("expected game over, got {other:?}"),
    }
    assert_eq!(engine.phase(), &GamePhase::Finished { outcome: GameOutcome::Won });
}

#[test]
fn goal_on_final_turn_is_a_win_not_a_timeout() {
    let mut engine = make_engine_at(10, 500, vec![0.99]);
    engine.end_turn().unwrap();
    let Continuation::GameOver(summary) = engine.continue_game().unwrap() else {
        panic!("final turn must end the game");
    };
    assert_eq!(summary.outcome, GameOutcome::Won, "win is checked before timeout");
}

#[test]
fn zero_money_at_turn_boundary_loses_broke() {
    // 10 money, school_supplies costs 12: clamped to 0.
    let mut engine = make_engine_at(4, 10, vec![0.0, pick(9)]);
    let record = expect_results(engine.end_turn().unwrap());
    assert_eq!(record.money_after, 0, "money is floored at zero");
    assert_eq!(engine.state().stats.lowest_money, 0);

    let Continuation::GameOver(summary) = engine.continue_game().unwrap() else {
        panic!("broke player must not get another turn");
    };
    assert_eq!(summary.outcome, GameOutcome::LostBroke);
    assert_eq!(summary.turn, 4);
}

#[test]
fn money_short_of_goal_after_last_turn_times_out() {
    let mut engine = make_engine_at(10, 200, vec![0.99]);
    engine.end_turn().unwrap();
    let Continuation::GameOver(summary) = engine.continue_game().unwrap() else {
        panic!("turn 10 is the last turn");
    };
    assert_eq!(summary.outcome, GameOutcome::LostTimeout);
    assert_eq!(summary.final_money, 200);
}

#[test]
fn finished_game_records_rank_and_rejects_commands() {
    let mut engine = make_engine_at(10, 200, vec![0.99]);
    engine.end_turn().unwrap();
    engine.continue_game().unwrap();

    let summary = engine.summary().expect("summary after game over");
    assert_eq!(summary.rank, Some(1), "first entry on an empty board ranks first");
    assert_eq!(engine.leaderboard().len(), 1);
    assert!(matches!(engine.end_turn(), Err(SimError::WrongPhase { phase: "finished", .. })));
    assert!(matches!(engine.continue_game(), Err(SimError::WrongPhase { .. })));
}

#[test]
fn play_again_keeps_goal_and_leaderboard() {
    let mut engine = make_engine_at(10, 200, vec![0.99]);
    engine.end_turn().unwrap();
    engine.continue_game().unwrap();

    let engine = engine.play_again("turn-test-2".into(), 8).unwrap();
    assert_eq!(engine.turn(), 1);
    assert_eq!(engine.money(), 100);
    assert_eq!(engine.state().goal_key, "bike");
    assert_eq!(engine.leaderboard().len(), 1, "the store carries over");
}

#[test]
fn engine_lists_recent_runs_and_clears_leaderboard() {
    let mut engine = make_engine_at(10, 200, vec![0.99]);
    engine.end_turn().unwrap();
    engine.continue_game().unwrap();

    let recent = engine.recent_runs(5);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].final_money, engine.money());
    assert!(engine.recent_runs(0).is_empty());

    engine.clear_leaderboard().unwrap();
    assert!(engine.leaderboard().is_empty());
    assert!(engine.recent_runs(5).is_empty());
}

#[test]
fn engine_logs_transitions_in_order() {
    let mut engine = make_engine(vec![0.0, 0.0, 0.99]);
    engine.set_allocation("shelly", 50).unwrap();
    engine.end_turn().unwrap();
    engine.continue_game().unwrap();

    let types: Vec<&str> = engine.drain_events().iter().map(|e| e.type_name()).collect();
    assert_eq!(
        types,
        vec![
            "game_started",
            "allocation_changed",
            "asset_returned",
            "investments_resolved",
            "turn_completed",
            "turn_started",
        ]
    );
    assert!(engine.drain_events().is_empty(), "drain empties the log");
}

#[test]
fn unknown_goal_is_rejected() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    let result = GameEngine::build("g".into(), 1, SimConfig::default_test(), "yacht", Box::new(store));
    assert!(matches!(result, Err(SimError::UnknownGoal { ref key }) if key == "yacht"));
}

#[test]
fn game_started_event_carries_setup() {
    let mut engine = make_engine(vec![]);
    let events = engine.drain_events();
    assert_eq!(
        events.first(),
        Some(&SimEvent::GameStarted {
            run_id:         "turn-test".into(),
            seed:           7,
            goal_key:       "bike".into(),
            starting_money: 100,
            goal:           500,
        })
    );
}
