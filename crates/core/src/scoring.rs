//! Scoring module - line clear points, combo bonus, levels and gravity speed
//!
//! Rules:
//! - Line clears score `LINE_SCORES[lines] * level` (levels start at 1).
//! - A clear made while a streak is running adds `combo * COMBO_BASE * level`, where
//!   `combo` is the streak length *before* this clear. The first clear of a streak
//!   therefore earns no bonus.
//! - Hard drops add `HARD_DROP_POINTS_PER_ROW` per row travelled, cleared lines or not.
//! - Difficulty never changes point values; it only shortens the tick interval.

use std::time::Duration;

use crate::types::{
    Difficulty, BASE_TICK_MS, COMBO_BASE, HARD_DROP_POINTS_PER_ROW, LEVEL_SPEEDUP,
    LINES_PER_LEVEL, LINE_SCORES, MIN_LEVEL_FACTOR,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Base points for the clear (`LINE_SCORES[lines] * level`).
    pub line_clear_score: u32,
    /// Streak bonus added on top of `line_clear_score`.
    pub combo_bonus: u32,
    /// Hard drop distance points.
    pub drop_bonus: u32,
    pub total: u32,
}

/// Calculate line clear score
/// lines: number of lines cleared (1-4)
/// level: current level (1-based)
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines > 4 {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level)
}

/// Calculate the streak bonus for a clear.
///
/// `combo` is the number of consecutive clearing locks before this one.
pub fn calculate_combo_bonus(combo: u32, level: u32) -> u32 {
    combo.saturating_mul(COMBO_BASE).saturating_mul(level)
}

/// Calculate hard drop score (+2 per row)
pub fn calculate_hard_drop_score(distance: u32) -> u32 {
    distance.saturating_mul(HARD_DROP_POINTS_PER_ROW)
}

/// Calculate complete score for one lock.
pub fn calculate_score(
    lines: usize,
    level: u32,
    is_hard_drop: bool,
    drop_distance: u32,
    combo: u32,
) -> ScoreResult {
    let line_clear_score = calculate_line_score(lines, level);
    let combo_bonus = if line_clear_score > 0 {
        calculate_combo_bonus(combo, level)
    } else {
        0
    };
    let drop_bonus = if is_hard_drop {
        calculate_hard_drop_score(drop_distance)
    } else {
        0
    };

    ScoreResult {
        line_clear_score,
        combo_bonus,
        drop_bonus,
        total: line_clear_score
            .saturating_add(combo_bonus)
            .saturating_add(drop_bonus),
    }
}

/// Level management
/// Level starts at 1 and increases every 10 lines cleared
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Named line clears shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClear {
    Single,
    Double,
    Triple,
    Tetris,
}

impl LineClear {
    pub fn from_lines(lines: usize) -> Option<Self> {
        match lines {
            1 => Some(LineClear::Single),
            2 => Some(LineClear::Double),
            3 => Some(LineClear::Triple),
            4 => Some(LineClear::Tetris),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineClear::Single => "Single",
            LineClear::Double => "Double",
            LineClear::Triple => "Triple",
            LineClear::Tetris => "Tetris",
        }
    }
}

/// Display name for a clear of `lines` rows, or "" when there is none
pub fn line_clear_name(lines: usize) -> &'static str {
    LineClear::from_lines(lines).map_or("", |clear| clear.name())
}

/// Tick interval in milliseconds for a level and difficulty.
///
/// `floor(BASE_TICK_MS * max(0.1, 1 - level * 0.05)) / multiplier`
pub fn tick_interval_ms(level: u32, difficulty: Difficulty) -> f64 {
    let factor = (1.0 - level as f64 * LEVEL_SPEEDUP).max(MIN_LEVEL_FACTOR);
    (BASE_TICK_MS as f64 * factor).floor() / difficulty.speed_multiplier()
}

/// [`tick_interval_ms`] as a `Duration`
pub fn tick_interval(level: u32, difficulty: Difficulty) -> Duration {
    Duration::from_secs_f64(tick_interval_ms(level, difficulty) / 1000.0)
}
