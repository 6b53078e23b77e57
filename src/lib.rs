//! Tetris engine (workspace facade crate).
//!
//! Re-exports the workspace crates as `tetris_engine::{types,core,store,driver}` so
//! embedders and the integration tests depend on a single package.

pub use tetris_engine_core as core;
pub use tetris_engine_driver as driver;
pub use tetris_engine_store as store;
pub use tetris_engine_types as types;
