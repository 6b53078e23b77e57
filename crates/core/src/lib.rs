//! Core game logic - pure, deterministic, and testable
//!
//! All rules of the falling-block engine live here with no I/O: the board, piece
//! geometry, placement and collision, scoring, the run state machine and the
//! achievement predicates. Persistence and timing live in the store and driver
//! crates.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with row clearing
//! - [`pieces`]: canonical shape matrices and clockwise rotation
//! - [`placement`]: validity checks, locking, drop distance, wall kicks
//! - [`rng`]: seeded piece roller
//! - [`scoring`]: line/combo/drop points, levels, gravity interval
//! - [`session`]: the `Loading → Running ⇄ Paused → GameOver` state machine
//! - [`achievements`]: unlock predicates over run stats
//! - [`snapshot`] / [`view`]: saved-game record and presentation view
//!
//! # Example
//!
//! ```
//! use tetris_engine_core::Session;
//! use tetris_engine_core::types::{ColorPalette, Difficulty, GameAction};
//!
//! let mut session = Session::new(Difficulty::Default, ColorPalette::Palette1, 12345);
//! session.start(0);
//!
//! session.apply_action(GameAction::MoveRight, 10);
//! session.apply_action(GameAction::Rotate, 20);
//! session.apply_action(GameAction::HardDrop, 30);
//!
//! // Hard drops award two points per row travelled.
//! assert!(session.score() > 0);
//! assert_eq!(session.take_last_event().map(|e| e.lines_cleared), Some(0));
//! ```
//!
//! # Timing
//!
//! The session never reads a clock. Callers pass monotonic milliseconds to every
//! time-dependent operation and schedule [`Session::tick`] every
//! [`Session::tick_interval`].

pub mod achievements;
pub mod board;
pub mod pieces;
pub mod placement;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod view;

pub use tetris_engine_types as types;

// Re-export commonly used types for convenience
pub use achievements::{evaluate, RunStats};
pub use board::Board;
pub use pieces::{shape_matrix, ShapeMatrix};
pub use placement::{is_valid_placement, try_rotate, Tetromino};
pub use rng::SimpleRng;
pub use scoring::{calculate_score, tick_interval, LineClear, ScoreResult};
pub use session::{LockEvent, RunSummary, Session, SessionPhase};
pub use snapshot::SessionSnapshot;
pub use view::{PieceView, SessionView};
