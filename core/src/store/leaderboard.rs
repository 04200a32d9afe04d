//! Store methods for the leaderboard.
//!
//! Ordering and truncation come from `ranking::Leaderboard`; the table
//! just mirrors its current contents with an explicit position column.

use crate::{
    error::SimResult,
    ranking::{Leaderboard, LeaderboardEntry},
};
use rusqlite::params;

use super::SimStore;

impl SimStore {
    pub fn leaderboard_entries(&self) -> SimResult<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_id, won, final_money, goal_key, turns, date, timestamp, stats_json
             FROM leaderboard_entry ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, won, final_money, goal_key, turns, date, timestamp, stats_json)| -> SimResult<LeaderboardEntry> {
                Ok(LeaderboardEntry {
                    id,
                    won,
                    final_money,
                    goal_key,
                    turns,
                    date,
                    timestamp,
                    stats: serde_json::from_str(&stats_json)?,
                })
            })
            .collect()
    }

    /// Insert, re-rank, truncate to `max_size`. Returns the new entry's rank.
    pub fn insert_leaderboard_entry(
        &self,
        entry: LeaderboardEntry,
        max_size: usize,
    ) -> SimResult<Option<usize>> {
        let mut board = Leaderboard::from_entries(self.leaderboard_entries()?, max_size);
        let rank = board.insert(entry);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM leaderboard_entry", [])?;
        for (position, e) in board.entries().iter().enumerate() {
            tx.execute(
                "INSERT INTO leaderboard_entry (
                    entry_id, position, won, final_money, goal_key, turns, date, timestamp, stats_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    e.id,
                    position as i64,
                    e.won,
                    e.final_money,
                    e.goal_key,
                    e.turns,
                    e.date,
                    e.timestamp,
                    serde_json::to_string(&e.stats)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(rank)
    }

    pub fn recent_leaderboard_entries(&self, count: usize) -> SimResult<Vec<LeaderboardEntry>> {
        let board = Leaderboard::from_entries(self.leaderboard_entries()?, usize::MAX);
        Ok(board.recent(count).into_iter().cloned().collect())
    }

    pub fn delete_leaderboard(&self) -> SimResult<()> {
        self.conn.execute("DELETE FROM leaderboard_entry", [])?;
        Ok(())
    }
}
