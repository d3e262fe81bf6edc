//! Top score leaderboard
//!
//! Persisted to durable storage as a JSON array of exactly
//! `MAX_LEADERBOARD_ENTRIES` rows, sorted by score descending. Unused slots
//! hold placeholder rows (name `-`, score 0). The player's display name lives
//! in the session store, separately from the table.

use serde::{Deserialize, Serialize};

use crate::observer::{Observers, SubscriptionId};
use crate::platform::KeyValueStore;
use crate::platform::storage::{load_json, save_json};

/// Number of ranked slots
pub const MAX_LEADERBOARD_ENTRIES: usize = 5;

/// Name and date of an unused slot
pub const PLACEHOLDER: &str = "-";

/// Name recorded when the player never entered one
pub const DEFAULT_PLAYER_NAME: &str = "User";

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub name: String,
    pub score: u32,
    /// Display date of the run
    pub date: String,
}

impl LeaderboardEntry {
    pub fn placeholder(rank: u32) -> Self {
        Self {
            rank,
            name: PLACEHOLDER.to_string(),
            score: 0,
            date: PLACEHOLDER.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER
    }
}

/// Outcome of `add_score`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Score not recorded; the table is unchanged
    Rejected,
    /// Score entered the table at `rank`
    Admitted { rank: u32, new_high_score: bool },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    player_name: String,
    name_requested: bool,
    new_high_score: bool,
    observers: Observers<Vec<LeaderboardEntry>>,
}

impl Leaderboard {
    /// Durable storage key for the table
    const TABLE_KEY: &'static str = "pixelTanksLeaderboard";
    /// Session storage key for the player name
    const PLAYER_NAME_KEY: &'static str = "pixelTanksPlayerName";

    /// Load the table and session player name. A missing, malformed or
    /// wrongly sized table is replaced by placeholders.
    pub fn load(durable: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        let player_name = match session.get(Self::PLAYER_NAME_KEY) {
            Ok(name) => name.unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to read player name: {}", e);
                String::new()
            }
        };

        let mut board = Self {
            entries: Vec::new(),
            durable,
            session,
            player_name,
            name_requested: false,
            new_high_score: false,
            observers: Observers::new(),
        };

        match load_json::<Vec<LeaderboardEntry>>(board.durable.as_ref(), Self::TABLE_KEY) {
            Ok(Some(entries)) if entries.len() == MAX_LEADERBOARD_ENTRIES => {
                log::info!("Loaded leaderboard ({} entries)", entries.len());
                board.entries = entries;
            }
            Ok(Some(entries)) => {
                log::warn!(
                    "Leaderboard has {} entries, expected {}; resetting",
                    entries.len(),
                    MAX_LEADERBOARD_ENTRIES
                );
                board.reset_leaderboard();
            }
            Ok(None) => {
                log::info!("No leaderboard found, starting fresh");
                board.reset_leaderboard();
            }
            Err(e) => {
                log::warn!("Failed to load leaderboard: {}; resetting", e);
                board.reset_leaderboard();
            }
        }
        board
    }

    /// Replace the table with placeholder rows and persist it
    pub fn reset_leaderboard(&mut self) {
        self.entries = (1..=MAX_LEADERBOARD_ENTRIES as u32)
            .map(LeaderboardEntry::placeholder)
            .collect();
        self.persist();
        self.observers.notify(&self.entries);
    }

    /// Record a finished run. Zero scores, and scores that would not make the
    /// table, are rejected without touching stored state.
    pub fn add_score(&mut self, score: u32, date: &str) -> Admission {
        self.new_high_score = false;
        if score == 0 {
            return Admission::Rejected;
        }

        let lowest = self.entries.last().map_or(0, |e| e.score);
        let has_free_slot = self.entries.iter().any(LeaderboardEntry::is_placeholder);
        if score <= lowest && !has_free_slot {
            return Admission::Rejected;
        }

        // Stable sort: the new row lands after existing rows with equal score
        let index = self.entries.iter().filter(|e| e.score >= score).count();
        if index >= MAX_LEADERBOARD_ENTRIES {
            return Admission::Rejected;
        }

        let mut table = self.entries.clone();
        table.push(LeaderboardEntry {
            rank: 0,
            name: self.display_name().to_string(),
            score,
            date: date.to_string(),
        });
        table.sort_by(|a, b| b.score.cmp(&a.score));
        let new_high_score = table.first().is_some_and(|e| e.score == score);
        table.truncate(MAX_LEADERBOARD_ENTRIES);
        for (i, entry) in table.iter_mut().enumerate() {
            entry.rank = i as u32 + 1;
        }

        self.entries = table;
        self.new_high_score = new_high_score;
        self.persist();
        self.observers.notify(&self.entries);

        let rank = index as u32 + 1;
        log::info!(
            "Score {} entered leaderboard at rank {}{}",
            score,
            rank,
            if new_high_score { " (new high score)" } else { "" }
        );
        Admission::Admitted {
            rank,
            new_high_score,
        }
    }

    /// Whether `score` would beat the current rank-1 row
    pub fn would_be_high_score(&self, score: u32) -> bool {
        let best = self
            .entries
            .first()
            .filter(|e| !e.is_placeholder())
            .map_or(0, |e| e.score);
        score > best
    }

    /// Whether the last `add_score` produced a new rank-1 score
    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    /// Rename every row recorded under `old`. Returns true if anything changed.
    pub fn update_username_in_leaderboard(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return false;
        }
        let mut updated = false;
        for entry in self.entries.iter_mut().filter(|e| e.name == old) {
            entry.name = new.to_string();
            updated = true;
        }
        if updated {
            self.persist();
            self.observers.notify(&self.entries);
        }
        updated
    }

    /// True until a name has been set or asked for this session
    pub fn needs_player_name(&self) -> bool {
        self.player_name.is_empty() && !self.name_requested
    }

    /// Store the player's name for this session
    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.to_string();
        self.name_requested = true;
        if let Err(e) = self.session.set(Self::PLAYER_NAME_KEY, name) {
            log::warn!("Failed to save player name: {}", e);
        }
        self.observers.notify(&self.entries);
    }

    /// Name as entered, empty if none
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Name used for new rows
    pub fn display_name(&self) -> &str {
        if self.player_name.is_empty() {
            DEFAULT_PLAYER_NAME
        } else {
            &self.player_name
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Snapshot of the table
    pub fn get_entries(&self) -> Vec<LeaderboardEntry> {
        self.entries.clone()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries
            .first()
            .filter(|e| !e.is_placeholder())
            .map(|e| e.score)
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Vec<LeaderboardEntry>) + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn persist(&mut self) {
        match save_json(self.durable.as_mut(), Self::TABLE_KEY, &self.entries) {
            Ok(()) => log::debug!("Leaderboard saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save leaderboard: {}", e),
        }
    }
}
