//! Leaderboard ordering and rank assignment.
//!
//! Entries are kept sorted descending by final money. The sort is stable
//! and new entries are appended before sorting, so a new score equal to
//! an existing one ranks below it.

use crate::{
    outcome::GameSummary,
    state::Stats,
    types::{GoalKey, Money, Turn},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub id:          String,
    pub won:         bool,
    pub final_money: Money,
    pub goal_key:    GoalKey,
    pub turns:       Turn,
    /// Calendar date, YYYY-MM-DD.
    pub date:        String,
    /// Unix milliseconds.
    pub timestamp:   i64,
    pub stats:       Stats,
}

impl LeaderboardEntry {
    pub fn from_summary(summary: &GameSummary, at: DateTime<Utc>) -> Self {
        Self {
            id:          uuid::Uuid::new_v4().to_string(),
            won:         summary.outcome.is_win(),
            final_money: summary.final_money,
            goal_key:    summary.goal_key.clone(),
            turns:       summary.turn,
            date:        at.format("%Y-%m-%d").to_string(),
            timestamp:   at.timestamp_millis(),
            stats:       summary.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leaderboard {
    entries:  Vec<LeaderboardEntry>,
    max_size: usize,
}

impl Leaderboard {
    pub fn new(max_size: usize) -> Self {
        Self { entries: Vec::new(), max_size }
    }

    /// Rebuild from persisted entries, re-establishing order and size.
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>, max_size: usize) -> Self {
        entries.sort_by(|a, b| b.final_money.cmp(&a.final_money));
        entries.truncate(max_size);
        Self { entries, max_size }
    }

    /// Insert and return the 1-based rank, or None if it fell off the end.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let id = entry.id.clone();
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.final_money.cmp(&a.final_money));
        self.entries.truncate(self.max_size);
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    /// Most recent `count` entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<&LeaderboardEntry> {
        let mut by_time: Vec<&LeaderboardEntry> = self.entries.iter().collect();
        by_time.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        by_time.truncate(count);
        by_time
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
