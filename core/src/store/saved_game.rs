//! Store methods for the single save-game slot.

use crate::{
    error::SimResult,
    snapshot::SaveSnapshot,
    state::SimulationState,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::SimStore;

impl SimStore {
    pub fn save_snapshot(&self, state: &SimulationState, saved_at: DateTime<Utc>) -> SimResult<()> {
        let snapshot = SaveSnapshot::capture(state, saved_at);
        let json = serde_json::to_string(&snapshot)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO saved_game (slot, run_id, turn, saved_at, state_json)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![snapshot.run_id, snapshot.turn, saved_at.to_rfc3339(), json],
        )?;
        log::debug!("Saved game {} at turn {}", snapshot.run_id, snapshot.turn);
        Ok(())
    }

    /// The saved snapshot, if one exists and was written by this version.
    pub fn load_snapshot(&self) -> SimResult<Option<SaveSnapshot>> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT state_json FROM saved_game WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(json) = json else { return Ok(None) };

        let snapshot: SaveSnapshot = serde_json::from_str(&json)?;
        if !snapshot.is_current() {
            log::warn!(
                "Discarding save for {} written by save version {}",
                snapshot.run_id,
                snapshot.version
            );
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    pub fn delete_snapshot(&self) -> SimResult<()> {
        self.conn.execute("DELETE FROM saved_game WHERE slot = 1", [])?;
        Ok(())
    }
}
