//! Saved-game snapshot: a serializable copy of a live session.
//!
//! Written after every state-affecting mutation so an interrupted session can be
//! resumed later. Transient fields (pause state, clock reference, banner, the
//! finalization flag) are not part of the snapshot.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::placement::Tetromino;
use crate::rng::SimpleRng;
use crate::types::{ColorPalette, Difficulty, PieceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub board: Board,
    pub current_piece: Option<Tetromino>,
    pub next_queue: Vec<PieceKind>,
    pub held_piece: Option<PieceKind>,
    pub can_hold: bool,
    pub rng: SimpleRng,
    pub score: u32,
    pub level: u32,
    pub rows_cleared: u32,
    pub combo_count: u32,
    #[serde(default)]
    pub max_combo: u32,
    pub tetris_count: u32,
    pub difficulty: Difficulty,
    pub color_palette: ColorPalette,
    pub active_play_time_ms: u64,
}
