//! Save / resume through SimStore, and games surviving a broken store.

use longgame_core::{
    config::SimConfig,
    engine::{Continuation, GameEngine},
    error::{SimError, SimResult},
    event::SimEvent,
    persistence::GameStore,
    ranking::LeaderboardEntry,
    rng::SequenceRng,
    snapshot::{SaveSnapshot, SAVE_VERSION},
    state::{GamePhase, SimulationState},
    store::SimStore,
};

/// Shared-cache in-memory database so the test and the engine can hold
/// separate connections to it.
fn shared_store(name: &str) -> SimStore {
    let store = SimStore::open(&format!("file:{name}?mode=memory&cache=shared")).unwrap();
    store.migrate().unwrap();
    store
}

/// Store whose every call fails.
struct BrokenStore;

impl GameStore for BrokenStore {
    fn load_game(&self) -> SimResult<Option<SimulationState>> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn save_game(&self, _state: &SimulationState) -> SimResult<()> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn clear_game(&self) -> SimResult<()> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn append_leaderboard_entry(&self, _entry: LeaderboardEntry, _max: usize) -> SimResult<Option<usize>> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn list_leaderboard(&self) -> SimResult<Vec<LeaderboardEntry>> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn recent_runs(&self, _count: usize) -> SimResult<Vec<LeaderboardEntry>> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
    fn clear_leaderboard(&self) -> SimResult<()> {
        Err(SimError::Other(anyhow::anyhow!("disk unavailable")))
    }
}

fn play_one_turn(engine: &mut GameEngine) {
    engine.set_allocation("shelly", 50).unwrap();
    engine.end_turn().unwrap();
    assert!(matches!(engine.continue_game().unwrap(), Continuation::NextTurn(_)));
}

#[test]
fn turn_start_saves_and_resume_restores() {
    let store = shared_store("persist_resume");
    let mut engine = GameEngine::build(
        "persist-1".into(),
        5,
        SimConfig::default_test(),
        "gaming",
        Box::new(store.reopen().unwrap()),
    )
    .unwrap()
    .with_rng(Box::new(SequenceRng::new(vec![0.0, 0.0, 0.99])));
    play_one_turn(&mut engine);

    let snapshot = store.load_snapshot().unwrap().expect("game saved at turn start");
    assert_eq!(snapshot.version, SAVE_VERSION);
    assert_eq!(snapshot.run_id, "persist-1");
    assert_eq!(snapshot.turn, 2);
    assert_eq!(snapshot.state, *engine.state());

    let mut resumed = GameEngine::resume_saved(SimConfig::default_test(), Box::new(store.reopen().unwrap()))
        .unwrap()
        .expect("saved game should resume");
    assert_eq!(resumed.run_id, "persist-1");
    assert_eq!(resumed.turn(), 2);
    assert_eq!(resumed.money(), 101);
    assert_eq!(resumed.state().goal_key, "gaming");
    assert_eq!(resumed.phase(), &GamePhase::Allocating);
    assert_eq!(resumed.state().history.len(), 1);
    assert!(matches!(resumed.drain_events().as_slice(), [SimEvent::GameResumed { turn: 2, .. }]));
}

#[test]
fn finished_game_clears_save_and_records_entry() {
    let store = shared_store("persist_finish");
    let config = SimConfig::default_test();
    let mut state = SimulationState::new("persist-2".into(), 5, &config.game, &config.assets, "bike".into());
    state.clock.current_turn = 9;
    state.money = 250;
    store.save_snapshot(&state, chrono::Utc::now()).unwrap();

    let mut engine = GameEngine::resume_saved(config, Box::new(store.reopen().unwrap()))
        .unwrap()
        .expect("saved game")
        .with_rng(Box::new(SequenceRng::new(vec![0.99])));
    play_one_turn(&mut engine);
    engine.end_turn().unwrap();
    let Continuation::GameOver(summary) = engine.continue_game().unwrap() else {
        panic!("turn 10 ends the game");
    };

    assert!(store.load_snapshot().unwrap().is_none(), "finished games leave no save behind");
    let board = store.leaderboard_entries().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].final_money, summary.final_money);
    assert_eq!(summary.rank, Some(1));
}

#[test]
fn nothing_to_resume_on_empty_store() {
    let store = shared_store("persist_empty");
    let resumed = GameEngine::resume_saved(SimConfig::default_test(), Box::new(store)).unwrap();
    assert!(resumed.is_none());
}

#[test]
fn save_from_another_version_is_discarded() {
    let store = shared_store("persist_version");
    let config = SimConfig::default_test();
    let state = SimulationState::new("old".into(), 1, &config.game, &config.assets, "bike".into());
    let mut snapshot = SaveSnapshot::capture(&state, chrono::Utc::now());
    snapshot.version = SAVE_VERSION + 1;

    // Write the foreign-version body straight into the slot.
    let conn = rusqlite::Connection::open_with_flags(
        "file:persist_version?mode=memory&cache=shared",
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_URI,
    )
    .unwrap();
    conn.execute(
        "INSERT OR REPLACE INTO saved_game (slot, run_id, turn, saved_at, state_json)
         VALUES (1, ?1, ?2, ?3, ?4)",
        rusqlite::params![
            snapshot.run_id,
            snapshot.turn,
            snapshot.saved_at.to_rfc3339(),
            serde_json::to_string(&snapshot).unwrap()
        ],
    )
    .unwrap();

    assert!(!snapshot.is_current());
    assert!(store.load_snapshot().unwrap().is_none(), "older or newer saves are ignored");
}

#[test]
fn broken_store_never_aborts_a_game() {
    let mut engine = GameEngine::build(
        "broken".into(),
        9,
        SimConfig::default_test(),
        "bike",
        Box::new(BrokenStore),
    )
    .unwrap();

    let summary = loop {
        engine.set_allocation("goldie", 50).unwrap();
        engine.end_turn().unwrap();
        if matches!(engine.phase(), GamePhase::AwaitingChoice { .. }) {
            engine.choose(1).unwrap();
        }
        if let Continuation::GameOver(summary) = engine.continue_game().unwrap() {
            break summary;
        }
    };
    assert_eq!(summary.rank, None, "no rank when the entry could not be stored");
    assert!(engine.leaderboard().is_empty());
    assert!(engine.recent_runs(5).is_empty());
    assert!(engine.clear_leaderboard().is_err(), "an explicit clear reports the failure");
    assert!(engine.state().is_finished());
}

#[test]
fn broken_store_means_nothing_to_resume() {
    let resumed = GameEngine::resume_saved(SimConfig::default_test(), Box::new(BrokenStore)).unwrap();
    assert!(resumed.is_none());
}

#[test]
fn reopened_in_memory_store_shares_the_database() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = SimConfig::default_test();
    let state = SimulationState::new("shared".into(), 3, &config.game, &config.assets, "bike".into());
    store.save_game(&state).unwrap();

    let second = store.reopen().unwrap();
    assert_eq!(second.load_game().unwrap().map(|s| s.run_id), Some("shared".to_string()));

    let other = SimStore::in_memory().unwrap();
    other.migrate().unwrap();
    assert!(other.load_game().unwrap().is_none(), "each in_memory() call is its own database");
}
