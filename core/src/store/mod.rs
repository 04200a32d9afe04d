//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The engine reaches it through the GameStore trait; the runner uses the
//! run and event-log methods directly.

use crate::{
    error::SimResult,
    event::EventLogEntry,
    persistence::GameStore,
    ranking::LeaderboardEntry,
    state::SimulationState,
    types::Turn,
};
use rusqlite::{params, Connection, OpenFlags};

mod leaderboard;
mod saved_game;

pub struct SimStore {
    conn: Connection,
    /// Database file or `file:` URI; `reopen` connects to it again.
    location: String,
}

impl SimStore {
    /// Open `location`, a plain path or a SQLite `file:` URI.
    pub fn open(location: &str) -> SimResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(location, flags)?;
        // In-memory databases reject WAL and keep their journal mode.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, location: location.to_owned() })
    }

    /// Fresh, uniquely named in-memory database. It lives until the last
    /// connection to it (including any from `reopen`) is dropped.
    pub fn in_memory() -> SimResult<Self> {
        let name = uuid::Uuid::new_v4().simple();
        Self::open(&format!("file:longgame_{name}?mode=memory&cache=shared"))
    }

    /// Second connection to the same database as `self`.
    pub fn reopen(&self) -> SimResult<Self> {
        Self::open(&self.location)
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        goal_key: &str,
        started_at: i64,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, goal_key, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, seed as i64, version, goal_key, started_at],
        )?;
        Ok(())
    }

    pub fn run_count(&self) -> SimResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, turn, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.run_id, entry.turn, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn events_for_turn(&self, run_id: &str, turn: Turn) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, turn, event_type, payload
             FROM event_log WHERE run_id = ?1 AND turn = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, turn], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    turn: row.get(2)?,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str) -> SimResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl GameStore for SimStore {
    fn load_game(&self) -> SimResult<Option<SimulationState>> {
        Ok(self.load_snapshot()?.map(|s| s.state))
    }

    fn save_game(&self, state: &SimulationState) -> SimResult<()> {
        self.save_snapshot(state, chrono::Utc::now())
    }

    fn clear_game(&self) -> SimResult<()> {
        self.delete_snapshot()
    }

    fn append_leaderboard_entry(
        &self,
        entry: LeaderboardEntry,
        max_size: usize,
    ) -> SimResult<Option<usize>> {
        self.insert_leaderboard_entry(entry, max_size)
    }

    fn list_leaderboard(&self) -> SimResult<Vec<LeaderboardEntry>> {
        self.leaderboard_entries()
    }

    fn recent_runs(&self, count: usize) -> SimResult<Vec<LeaderboardEntry>> {
        self.recent_leaderboard_entries(count)
    }

    fn clear_leaderboard(&self) -> SimResult<()> {
        self.delete_leaderboard()
    }
}
