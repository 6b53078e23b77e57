//! Timer-driven runner for a game session.
//!
//! Owns one [`Session`](tetris_engine_core::Session), schedules its gravity ticks
//! on tokio time, and sequences persistence: saved game after every mutation,
//! stats and achievements exactly once at the end.
//!
//! ```no_run
//! use tetris_engine_driver::{Command, Driver, DriverConfig};
//! use tetris_engine_store::{FileStore, Storage};
//! use tetris_engine_types::GameAction;
//!
//! # async fn demo() {
//! let config = DriverConfig::from_env();
//! let storage = Storage::new(FileStore::new(&config.data_dir));
//! let driver = Driver::load(storage, &config).await;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(32);
//! let game = tokio::spawn(driver.run(rx));
//! tx.send(Command::Action(GameAction::HardDrop)).await.unwrap();
//! tx.send(Command::Exit).await.unwrap();
//! let _summary = game.await.unwrap();
//! # }
//! ```

pub mod config;
pub mod driver;

pub use config::DriverConfig;
pub use driver::{Command, Driver, DriverEvent};
