//! Persisted records
//!
//! Every record deserializes with per-field defaults, so a record written by an
//! older build (or a partial hand edit) still loads; only a value of the wrong
//! shape makes the whole record fall back to its default.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tetris_engine_core::RunSummary;
use tetris_engine_types::{
    AchievementId, ColorPalette, ControlMode, Difficulty, ACHIEVEMENT_COUNT, BEST_RUNS_LIMIT,
};

use crate::error::{Result, StoreError};

pub const SETTINGS_KEY: &str = "tetris:settings:v1";
pub const STATS_KEY: &str = "tetris:stats:v1";
pub const ACHIEVEMENTS_KEY: &str = "tetris:achievements:v1";
pub const SAVED_GAME_KEY: &str = "tetris:saved-game:v1";

/// Player settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub difficulty: Difficulty,
    pub visual_effects_enabled: bool,
    pub color_palette: ColorPalette,
    pub control_mode: ControlMode,
    /// Key labels; only the input layer interprets them.
    pub pause_key: String,
    pub primary_key: String,
    pub secondary_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Default,
            visual_effects_enabled: true,
            color_palette: ColorPalette::Palette1,
            control_mode: ControlMode::ArrowKeys,
            pause_key: "E".to_string(),
            primary_key: "Space".to_string(),
            secondary_key: "C".to_string(),
        }
    }
}

impl Settings {
    /// Update one field from its camelCase name and a string value
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || StoreError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "difficulty" => self.difficulty = Difficulty::from_str(value).ok_or_else(invalid)?,
            "visualEffectsEnabled" => {
                self.visual_effects_enabled = value.parse().map_err(|_| invalid())?
            }
            "colorPalette" => {
                self.color_palette = ColorPalette::from_str(value).ok_or_else(invalid)?
            }
            "controlMode" => self.control_mode = ControlMode::from_str(value).ok_or_else(invalid)?,
            "pauseKey" | "primaryKey" | "secondaryKey" if value.trim().is_empty() => {
                return Err(invalid())
            }
            "pauseKey" => self.pause_key = value.to_string(),
            "primaryKey" => self.primary_key = value.to_string(),
            "secondaryKey" => self.secondary_key = value.to_string(),
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

/// One finished run in the best-runs table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub score: u32,
    pub level: u32,
    pub rows_cleared: u32,
    pub play_time_ms: u64,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

/// Lifetime aggregate stats
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub total_games_played: u32,
    pub best_score: u32,
    pub best_level: u32,
    pub most_rows_cleared: u32,
    pub best_combo: u32,
    pub total_score: u64,
    pub total_play_time_ms: u64,
    /// Highest scores first, at most `BEST_RUNS_LIMIT` entries
    pub best_runs: Vec<RunRecord>,
}

impl Stats {
    /// Fold one finished run into the aggregates
    pub fn record(&mut self, run: &RunSummary, at: DateTime<Utc>) {
        self.total_games_played += 1;
        self.total_score += u64::from(run.score);
        self.total_play_time_ms += run.play_time_ms;

        self.best_score = self.best_score.max(run.score);
        self.best_level = self.best_level.max(run.level);
        self.most_rows_cleared = self.most_rows_cleared.max(run.rows_cleared);
        self.best_combo = self.best_combo.max(run.best_combo);

        self.best_runs.push(RunRecord {
            score: run.score,
            level: run.level,
            rows_cleared: run.rows_cleared,
            play_time_ms: run.play_time_ms,
            difficulty: run.difficulty,
            timestamp: at,
        });
        // Stable sort: ties keep the older run first.
        self.best_runs.sort_by(|a, b| b.score.cmp(&a.score));
        self.best_runs.truncate(BEST_RUNS_LIMIT);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlock {
    pub unlocked_at: DateTime<Utc>,
}

/// Unlocked achievements with their first-unlock timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AchievementsRecord {
    pub unlocked: BTreeMap<AchievementId, Unlock>,
    pub total_achievements: u32,
}

impl Default for AchievementsRecord {
    fn default() -> Self {
        Self {
            unlocked: BTreeMap::new(),
            total_achievements: ACHIEVEMENT_COUNT,
        }
    }
}

impl AchievementsRecord {
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains_key(&id)
    }

    /// Record an unlock. An existing timestamp is never overwritten.
    ///
    /// Returns true if `id` was newly unlocked.
    pub fn unlock(&mut self, id: AchievementId, at: DateTime<Utc>) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked.insert(id, Unlock { unlocked_at: at });
        true
    }

    pub fn unlocked_at(&self, id: AchievementId) -> Option<DateTime<Utc>> {
        self.unlocked.get(&id).map(|u| u.unlocked_at)
    }
}
