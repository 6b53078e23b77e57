//! Persistence for settings, lifetime stats, achievements and the saved game.
//!
//! Records are JSON documents under versioned keys:
//!
//! | Key | Record |
//! |-----|--------|
//! | `tetris:settings:v1` | [`Settings`] |
//! | `tetris:stats:v1` | [`Stats`] with the best-runs table |
//! | `tetris:achievements:v1` | [`AchievementsRecord`] |
//! | `tetris:saved-game:v1` | [`SessionSnapshot`](tetris_engine_core::SessionSnapshot) |
//!
//! ```
//! use tetris_engine_store::{MemoryStore, Storage};
//!
//! # tokio_test::block_on(async {
//! let storage = Storage::new(MemoryStore::new());
//! let settings = storage.load_settings().await;
//! assert_eq!(settings.pause_key, "E");
//! # });
//! ```

pub mod error;
pub mod kv;
pub mod records;
pub mod storage;

pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use records::{
    AchievementsRecord, RunRecord, Settings, Stats, Unlock, ACHIEVEMENTS_KEY, SAVED_GAME_KEY,
    SETTINGS_KEY, STATS_KEY,
};
pub use storage::Storage;
