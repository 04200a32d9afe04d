//! Persistence contract the engine calls into.
//!
//! RULE: the engine treats every call as best effort. A failing store is
//! logged and ignored; it never ends a game.

use crate::{error::SimResult, ranking::LeaderboardEntry, state::SimulationState};

pub trait GameStore {
    /// The saved in-progress game, if any.
    fn load_game(&self) -> SimResult<Option<SimulationState>>;

    /// Overwrite the single save slot with `state`.
    fn save_game(&self, state: &SimulationState) -> SimResult<()>;

    fn clear_game(&self) -> SimResult<()>;

    /// Record a finished game. Returns its 1-based rank, or None when it
    /// did not make the top `max_size`.
    fn append_leaderboard_entry(
        &self,
        entry: LeaderboardEntry,
        max_size: usize,
    ) -> SimResult<Option<usize>>;

    /// Entries ordered by final money, best first.
    fn list_leaderboard(&self) -> SimResult<Vec<LeaderboardEntry>>;

    /// Up to `count` recorded games, newest first.
    fn recent_runs(&self, count: usize) -> SimResult<Vec<LeaderboardEntry>>;

    fn clear_leaderboard(&self) -> SimResult<()>;
}
