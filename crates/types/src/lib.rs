//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with `serde` derives so they can travel through the
//! persistence layer unchanged.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//!
//! # Timing
//!
//! Gravity is expressed as a tick interval in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_TICK_MS` | 800 | Tick interval at level 0 on default difficulty |
//! | `MIN_LEVEL_FACTOR` | 0.1 | Floor of the level speed factor |
//! | `LEVEL_SPEEDUP` | 0.05 | Speed factor lost per level |
//! | `LINE_CLEAR_BANNER_MS` | 2000 | How long a line-clear name stays visible |
//!
//! Difficulty divides the interval further: default 1x, medium 1.8x, hard 3x.
//!
//! # Examples
//!
//! ```
//! use tetris_engine_types::{Difficulty, GameAction, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Rotation::from_turns(5), Rotation::East);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! assert_eq!(Difficulty::Hard.speed_multiplier(), 3.0);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Tick interval at level 0 on default difficulty (milliseconds)
pub const BASE_TICK_MS: u32 = 800;

/// Speed factor lost per level
pub const LEVEL_SPEEDUP: f64 = 0.05;

/// Lower bound of the level speed factor (10% of the base interval)
pub const MIN_LEVEL_FACTOR: f64 = 0.1;

/// How long the name of the most recent line clear stays visible
pub const LINE_CLEAR_BANNER_MS: u64 = 2000;

/// Number of upcoming pieces kept in the preview queue
pub const NEXT_QUEUE_LEN: usize = 3;

/// Rows needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Line clear scoring table, indexed by lines cleared.
///
/// Points are multiplied by the current level (levels start at 1).
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Combo bonus per streak step, multiplied by level.
pub const COMBO_BASE: u32 = 50;

/// Points per row travelled by a hard drop.
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Number of best runs kept in the persisted stats.
pub const BEST_RUNS_LIMIT: usize = 5;

/// Total number of achievements.
pub const ACHIEVEMENT_COUNT: u32 = 5;

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All piece kinds in canonical order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_engine_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("Z"), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "I" => Some(PieceKind::I),
            "J" => Some(PieceKind::J),
            "L" => Some(PieceKind::L),
            "O" => Some(PieceKind::O),
            "S" => Some(PieceKind::S),
            "T" => Some(PieceKind::T),
            "Z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::J => "J",
            PieceKind::L => "L",
            PieceKind::O => "O",
            PieceKind::S => "S",
            PieceKind::T => "T",
            PieceKind::Z => "Z",
        }
    }
}

/// Rotation states, counted in clockwise quarter turns from spawn.
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from North (0-3)
    pub fn turns(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Build a rotation from any number of quarter turns (taken mod 4)
    pub fn from_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }
}

/// Difficulty only affects gravity speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Default,
    Medium,
    Hard,
}

impl Difficulty {
    /// Divisor applied to the level tick interval
    pub fn speed_multiplier(&self) -> f64 {
        match self {
            Difficulty::Default => 1.0,
            Difficulty::Medium => 1.8,
            Difficulty::Hard => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Default => "default",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Difficulty::Default),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Color palette used to tag locked blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPalette {
    #[default]
    Palette1,
    Palette2,
}

impl ColorPalette {
    /// Hex color tag for a piece kind in this palette
    pub fn color(&self, kind: PieceKind) -> &'static str {
        match (self, kind) {
            (ColorPalette::Palette1, PieceKind::I) => "#39FF14",
            (ColorPalette::Palette1, PieceKind::J) => "#FF0000",
            (ColorPalette::Palette1, PieceKind::L) => "#800080",
            (ColorPalette::Palette1, PieceKind::O) => "#FFA500",
            (ColorPalette::Palette1, PieceKind::S) => "#0000FF",
            (ColorPalette::Palette1, PieceKind::T) => "#FFFF00",
            (ColorPalette::Palette1, PieceKind::Z) => "#00FFFF",
            (ColorPalette::Palette2, PieceKind::I) => "#00FFFF",
            (ColorPalette::Palette2, PieceKind::J) => "#0000FF",
            (ColorPalette::Palette2, PieceKind::L) => "#FFA500",
            (ColorPalette::Palette2, PieceKind::O) => "#FFFF00",
            (ColorPalette::Palette2, PieceKind::S) => "#008000",
            (ColorPalette::Palette2, PieceKind::T) => "#FF00FF",
            (ColorPalette::Palette2, PieceKind::Z) => "#FF0000",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorPalette::Palette1 => "palette1",
            ColorPalette::Palette2 => "palette2",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "palette1" => Some(ColorPalette::Palette1),
            "palette2" => Some(ColorPalette::Palette2),
            _ => None,
        }
    }
}

/// Which key cluster drives movement (consumed by the input layer only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlMode {
    #[default]
    ArrowKeys,
    Wasd,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::ArrowKeys => "arrowKeys",
            ControlMode::Wasd => "wasd",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arrowkeys" => Some(ControlMode::ArrowKeys),
            "wasd" => Some(ControlMode::Wasd),
            _ => None,
        }
    }
}

/// A locked block: the piece it came from and the palette it was drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub kind: PieceKind,
    pub palette: ColorPalette,
}

impl Block {
    pub fn new(kind: PieceKind, palette: ColorPalette) -> Self {
        Self { kind, palette }
    }

    /// Color tag of this block
    pub fn color(&self) -> &'static str {
        self.palette.color(self.kind)
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Block)`: Occupied by a locked block
pub type Cell = Option<Block>;

/// Player actions understood by the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down (never locks)
    MoveDown,
    /// Rotate piece 90° clockwise with left/right kicks
    Rotate,
    /// Drop to the lowest valid position and lock immediately
    HardDrop,
    /// Swap with the held piece (once per spawn)
    Hold,
    /// Toggle pause
    TogglePause,
}

impl GameAction {
    /// Parse action from a camelCase name (case-insensitive)
    ///
    /// ```
    /// use tetris_engine_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("togglepause"), Some(GameAction::TogglePause));
    /// assert_eq!(GameAction::from_str("restart"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "movedown" => Some(GameAction::MoveDown),
            "rotate" => Some(GameAction::Rotate),
            "harddrop" => Some(GameAction::HardDrop),
            "hold" => Some(GameAction::Hold),
            "togglepause" => Some(GameAction::TogglePause),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::MoveDown => "moveDown",
            GameAction::Rotate => "rotate",
            GameAction::HardDrop => "hardDrop",
            GameAction::Hold => "hold",
            GameAction::TogglePause => "togglePause",
        }
    }
}

/// Achievement identifiers, serialized with their persisted snake_case ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    BlockPlacer,
    BlockMaster,
    AlmostImpossible,
    BoardMaster,
    Secret,
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::BlockPlacer,
        AchievementId::BlockMaster,
        AchievementId::AlmostImpossible,
        AchievementId::BoardMaster,
        AchievementId::Secret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::BlockPlacer => "block_placer",
            AchievementId::BlockMaster => "block_master",
            AchievementId::AlmostImpossible => "almost_impossible",
            AchievementId::BoardMaster => "board_master",
            AchievementId::Secret => "secret",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AchievementId::BlockPlacer => "Block Placer",
            AchievementId::BlockMaster => "Block Master",
            AchievementId::AlmostImpossible => "Almost Impossible",
            AchievementId::BoardMaster => "Board Master",
            AchievementId::Secret => "Secret Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::BlockPlacer => "Reach Level 10",
            AchievementId::BlockMaster => "Reach Level 25",
            AchievementId::AlmostImpossible => "Reach Level 15 on Hard difficulty",
            AchievementId::BoardMaster => {
                "Clear four rows at once (Tetris) at least twice in one game"
            }
            AchievementId::Secret => "Achieve a combo of 10 or more",
        }
    }

    /// Secret achievements stay hidden until unlocked
    pub fn is_secret(&self) -> bool {
        matches!(self, AchievementId::Secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_turns_wrap() {
        for turns in 0..8u8 {
            assert_eq!(Rotation::from_turns(turns).turns(), turns % 4);
        }
        let mut r = Rotation::North;
        for _ in 0..4 {
            r = r.rotate_cw();
        }
        assert_eq!(r, Rotation::North);
    }

    #[test]
    fn settings_enums_use_persisted_names() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        assert_eq!(
            serde_json::to_string(&ColorPalette::Palette2).unwrap(),
            "\"palette2\""
        );
        assert_eq!(
            serde_json::to_string(&ControlMode::ArrowKeys).unwrap(),
            "\"arrowKeys\""
        );
        assert_eq!(
            serde_json::to_string(&AchievementId::AlmostImpossible).unwrap(),
            "\"almost_impossible\""
        );
    }

    #[test]
    fn palettes_differ_per_kind() {
        let block = Block::new(PieceKind::I, ColorPalette::Palette1);
        assert_eq!(block.color(), "#39FF14");
        let block = Block::new(PieceKind::I, ColorPalette::Palette2);
        assert_eq!(block.color(), "#00FFFF");
    }

    #[test]
    fn only_secret_is_hidden() {
        let hidden: Vec<_> = AchievementId::ALL.iter().filter(|a| a.is_secret()).collect();
        assert_eq!(hidden, vec![&AchievementId::Secret]);
        assert_eq!(AchievementId::ALL.len() as u32, ACHIEVEMENT_COUNT);
    }
}
