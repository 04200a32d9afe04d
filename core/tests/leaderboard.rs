//! Leaderboard ordering, truncation, and rank, in memory and in SQLite.

use longgame_core::{
    persistence::GameStore,
    ranking::{Leaderboard, LeaderboardEntry},
    state::Stats,
    store::SimStore,
};

const MAX: usize = 20;

fn entry(id: &str, final_money: i64, timestamp: i64) -> LeaderboardEntry {
    LeaderboardEntry {
        id: id.into(),
        won: final_money >= 500,
        final_money,
        goal_key: "bike".into(),
        turns: 10,
        date: "2026-03-01".into(),
        timestamp,
        stats: Stats::default(),
    }
}

fn make_store() -> SimStore {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn board_keeps_top_entries_sorted() {
    let mut board = Leaderboard::new(MAX);
    for i in 0..30 {
        // Scrambled order: 0, 7, 14, ... mod 30.
        let money = (i * 7 % 30) as i64 * 10;
        board.insert(entry(&format!("e{i}"), money, i));
    }
    assert_eq!(board.len(), MAX);
    let money: Vec<i64> = board.entries().iter().map(|e| e.final_money).collect();
    assert!(money.windows(2).all(|w| w[0] >= w[1]), "not descending: {money:?}");
    assert_eq!(money[0], 290);
    assert_eq!(*money.last().unwrap(), 100, "the 10 lowest scores fell off");
}

#[test]
fn new_top_score_ranks_first() {
    let mut board = Leaderboard::new(MAX);
    for i in 0..MAX {
        board.insert(entry(&format!("e{i}"), 100 + i as i64, i as i64));
    }
    assert_eq!(board.insert(entry("top", 999, 100)), Some(1));
    assert_eq!(board.best().map(|e| e.id.as_str()), Some("top"));
    assert_eq!(board.len(), MAX);
}

#[test]
fn low_score_on_full_board_is_not_ranked() {
    let mut board = Leaderboard::new(MAX);
    for i in 0..MAX {
        board.insert(entry(&format!("e{i}"), 200, i as i64));
    }
    assert_eq!(board.insert(entry("low", 150, 100)), None);
    assert!(board.entries().iter().all(|e| e.id != "low"));
}

#[test]
fn equal_score_ranks_below_existing() {
    let mut board = Leaderboard::new(MAX);
    board.insert(entry("first", 300, 1));
    assert_eq!(board.insert(entry("second", 300, 2)), Some(2));
    assert_eq!(board.entries()[0].id, "first");
}

#[test]
fn recent_orders_by_timestamp() {
    let mut board = Leaderboard::new(MAX);
    board.insert(entry("old", 400, 10));
    board.insert(entry("newest", 50, 30));
    board.insert(entry("middle", 250, 20));
    let ids: Vec<&str> = board.recent(2).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["newest", "middle"]);
}

#[test]
fn store_round_trips_entries_in_rank_order() {
    let store = make_store();
    let mut stats = Stats::default();
    stats.scams_avoided = 3;
    let mut winner = entry("winner", 520, 3);
    winner.stats = stats.clone();

    assert_eq!(store.insert_leaderboard_entry(entry("a", 200, 1), MAX).unwrap(), Some(1));
    assert_eq!(store.insert_leaderboard_entry(entry("b", 90, 2), MAX).unwrap(), Some(2));
    assert_eq!(store.insert_leaderboard_entry(winner, MAX).unwrap(), Some(1));

    let loaded = store.leaderboard_entries().unwrap();
    let ids: Vec<&str> = loaded.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["winner", "a", "b"]);
    assert!(loaded[0].won);
    assert_eq!(loaded[0].stats, stats, "stats survive the JSON column");
}

#[test]
fn store_truncates_to_max_size() {
    let store = make_store();
    for i in 0..25 {
        store.insert_leaderboard_entry(entry(&format!("e{i}"), i * 10, i), MAX).unwrap();
    }
    let loaded = store.leaderboard_entries().unwrap();
    assert_eq!(loaded.len(), MAX);
    assert_eq!(loaded[0].final_money, 240);
    assert_eq!(loaded[MAX - 1].final_money, 50);
}

#[test]
fn store_lists_recent_runs_and_clears() {
    let store = make_store();
    store.insert_leaderboard_entry(entry("old", 400, 10), MAX).unwrap();
    store.insert_leaderboard_entry(entry("newest", 50, 30), MAX).unwrap();
    store.insert_leaderboard_entry(entry("middle", 250, 20), MAX).unwrap();

    let recent = store.recent_runs(2).unwrap();
    let ids: Vec<&str> = recent.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["newest", "middle"], "recent runs are newest first, not best first");
    assert_eq!(store.recent_runs(10).unwrap().len(), 3);

    store.clear_leaderboard().unwrap();
    assert!(store.list_leaderboard().unwrap().is_empty());
    assert!(store.recent_runs(5).unwrap().is_empty());
}
