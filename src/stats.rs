use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::quiz::QuestionKind;

/// Entries kept in `StoredStats::game_history`
pub const HISTORY_LEN: usize = 10;

/// Result of one finished game, handed to the store once
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub score: u32,
    pub questions: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub best_streak: u32,
    pub game_type: QuestionKind,
    pub game_id: String,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub questions: usize,
    pub game_type: QuestionKind,
    pub streak: u32,
}

/// Aggregate over every saved game
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredStats {
    pub total_games: u32,
    pub total_score: u64,
    pub best_score: u32,
    pub best_streak: u32,
    pub last_played: Option<DateTime<Utc>>,
    /// Newest last
    pub game_history: Vec<HistoryEntry>,
}

impl StoredStats {
    pub fn record(&mut self, stats: &GameStats, played_at: DateTime<Utc>) {
        self.total_games += 1;
        self.total_score += u64::from(stats.score);
        self.best_score = self.best_score.max(stats.score);
        self.best_streak = self.best_streak.max(stats.best_streak);
        self.last_played = Some(played_at);
        self.game_history.push(HistoryEntry {
            date: played_at,
            score: stats.score,
            questions: stats.questions,
            game_type: stats.game_type,
            streak: stats.best_streak,
        });
        if self.game_history.len() > HISTORY_LEN {
            let excess = self.game_history.len() - HISTORY_LEN;
            self.game_history.drain(..excess);
        }
    }

    pub fn average_score(&self) -> u64 {
        if self.total_games == 0 {
            return 0;
        }
        (self.total_score as f64 / f64::from(self.total_games)).round() as u64
    }
}

/// Persistence for finished games
pub trait StatsStore: Send + Sync {
    fn save(&self, stats: &GameStats) -> Result<StoredStats>;
    fn read(&self) -> Result<StoredStats>;
}

/// Stats kept as pretty JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStatsStore {
    path: PathBuf,
}

impl JsonFileStatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStore for JsonFileStatsStore {
    fn save(&self, stats: &GameStats) -> Result<StoredStats> {
        // Unreadable file: start a fresh aggregate
        let mut stored = self.read().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "discarding unreadable stats file");
            StoredStats::default()
        });
        stored.record(stats, Utc::now());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&stored).context("Failed to serialize stats")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write stats to {}", self.path.display()))?;

        debug!(path = %self.path.display(), total_games = stored.total_games, "stats saved");
        Ok(stored)
    }

    fn read(&self) -> Result<StoredStats> {
        if !self.path.exists() {
            return Ok(StoredStats::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stats in {}", self.path.display()))
    }
}

/// In-memory store; remembers every game it was handed
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    stored: Mutex<StoredStats>,
    saved: Mutex<Vec<GameStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<GameStats> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl StatsStore for MemoryStatsStore {
    fn save(&self, stats: &GameStats) -> Result<StoredStats> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stats.clone());
        let mut stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        stored.record(stats, Utc::now());
        Ok(stored.clone())
    }

    fn read(&self) -> Result<StoredStats> {
        Ok(self.stored.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
