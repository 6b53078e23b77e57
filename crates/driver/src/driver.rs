//! Session driver - timing and persistence around a [`Session`]
//!
//! Everything runs on one task. The driver owns the session, arms a single tick
//! deadline while the session is running, and after each committed mutation:
//!
//! 1. evaluates achievements if the mutation cleared rows,
//! 2. finalizes on game over, otherwise writes the saved game.
//!
//! Finalization happens at most once per session: the session's own flag is
//! checked and set before any stats or achievement write.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use tetris_engine_core::achievements::evaluate;
use tetris_engine_core::{LineClear, RunStats, RunSummary, Session, SessionView};
use tetris_engine_store::{AchievementsRecord, KeyValueStore, Settings, Storage};
use tetris_engine_types::{AchievementId, GameAction};

use crate::config::DriverConfig;

/// Inbound control message for [`Driver::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Action(GameAction),
    Pause,
    Resume,
    /// Tear down: finalize and stop the loop
    Exit,
}

/// Notable things that happened, for presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    LineClear {
        clear: LineClear,
        points: u32,
        combo: u32,
    },
    AchievementUnlocked(AchievementId),
    GameOver(RunSummary),
}

pub struct Driver<S: KeyValueStore> {
    storage: Storage<S>,
    session: Session,
    settings: Settings,
    achievements: AchievementsRecord,
    epoch: Instant,
    next_tick: Option<Instant>,
    summary: Option<RunSummary>,
    events: Option<mpsc::UnboundedSender<DriverEvent>>,
}

impl<S: KeyValueStore> Driver<S> {
    /// Loading phase: read settings and achievements, build or resume the
    /// session, then start it.
    pub async fn load(storage: Storage<S>, config: &DriverConfig) -> Self {
        let settings = storage.load_settings().await;
        let achievements = storage.load_achievements().await;

        let saved = if config.resume {
            storage.load_saved_game().await
        } else {
            None
        };
        let session = match saved {
            Some(snapshot) => {
                debug!(score = snapshot.score, "resuming saved game");
                Session::from_snapshot(snapshot)
            }
            None => Session::new(
                settings.difficulty,
                settings.color_palette,
                config.seed_or_clock(),
            ),
        };

        let mut driver = Self {
            storage,
            session,
            settings,
            achievements,
            epoch: Instant::now(),
            next_tick: None,
            summary: None,
            events: None,
        };

        let now = driver.now_ms();
        driver.session.start(now);
        driver.arm_tick();
        driver.commit(now).await;
        driver
    }

    /// Deliver [`DriverEvent`]s to `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<DriverEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    /// Final numbers, once the session has been finalized
    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
    }

    pub fn view(&self) -> SessionView<'_> {
        self.session.view(self.now_ms())
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn emit(&self, event: DriverEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn arm_tick(&mut self) {
        self.next_tick = self
            .session
            .is_running()
            .then(|| Instant::now() + self.session.tick_interval());
    }

    /// Next gravity deadline; None while paused, before start or after game over
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub async fn handle_action(&mut self, action: GameAction) -> bool {
        let now = self.now_ms();
        let changed = self.session.apply_action(action, now);
        if changed {
            if action == GameAction::TogglePause {
                self.arm_tick();
            }
            self.commit(now).await;
        }
        changed
    }

    pub async fn on_tick(&mut self) -> bool {
        let now = self.now_ms();
        let changed = self.session.tick(now);
        self.arm_tick();
        if changed {
            self.commit(now).await;
        }
        changed
    }

    pub async fn pause(&mut self) -> bool {
        let now = self.now_ms();
        let changed = self.session.pause(now);
        if changed {
            self.next_tick = None;
            self.commit(now).await;
        }
        changed
    }

    pub async fn resume(&mut self) -> bool {
        let now = self.now_ms();
        let changed = self.session.resume(now);
        if changed {
            self.arm_tick();
            self.commit(now).await;
        }
        changed
    }

    /// Teardown: finalize whatever state the session is in.
    ///
    /// Safe to call any number of times; stats are recorded once.
    pub async fn shutdown(&mut self) -> Option<RunSummary> {
        let now = self.now_ms();
        self.finalize(now).await;
        self.summary
    }

    /// Serve commands and ticks until exit, channel close, or game over.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Option<RunSummary> {
        while !self.session.is_finalized() {
            let deadline = self.next_tick;
            tokio::select! {
                _ = wait_for(deadline) => {
                    self.on_tick().await;
                }
                command = commands.recv() => match command {
                    Some(Command::Action(action)) => {
                        self.handle_action(action).await;
                    }
                    Some(Command::Pause) => {
                        self.pause().await;
                    }
                    Some(Command::Resume) => {
                        self.resume().await;
                    }
                    Some(Command::Exit) | None => break,
                },
            }
        }
        self.shutdown().await
    }

    /// Post-mutation bookkeeping: achievements, then game over or saved game.
    async fn commit(&mut self, now: u64) {
        if let Some(event) = self.session.take_last_event() {
            debug!(
                lines = event.lines_cleared,
                points = event.points,
                combo = event.combo,
                "piece locked"
            );
            if let Some(clear) = event.line_clear {
                self.emit(DriverEvent::LineClear {
                    clear,
                    points: event.points,
                    combo: event.combo,
                });
                let stats = self.session.run_stats();
                self.unlock_qualified(&stats).await;
            }
        }

        if self.session.is_game_over() {
            debug!(score = self.session.score(), "game over");
            self.next_tick = None;
            self.finalize(now).await;
        } else if !self.session.is_finalized() {
            self.storage.save_game(&self.session.snapshot()).await;
        }
    }

    async fn unlock_qualified(&mut self, stats: &RunStats) {
        let qualified = evaluate(stats, |id| self.achievements.is_unlocked(id));
        if qualified.is_empty() {
            return;
        }

        let at = Utc::now();
        let fresh = self.storage.unlock_achievements(&qualified, at).await;
        for &id in &qualified {
            self.achievements.unlock(id, at);
        }
        for id in fresh {
            info!(achievement = id.as_str(), "achievement unlocked");
            self.emit(DriverEvent::AchievementUnlocked(id));
        }
    }

    async fn finalize(&mut self, now: u64) {
        let Some(summary) = self.session.finalize(now) else {
            return;
        };
        self.next_tick = None;
        self.summary = Some(summary);

        self.storage.record_run(&summary, Utc::now()).await;
        self.unlock_qualified(&summary.run_stats()).await;
        self.storage.clear_saved_game().await;
        debug!(
            score = summary.score,
            play_time_ms = summary.play_time_ms,
            game_over = summary.game_over,
            "session finalized"
        );

        if summary.game_over {
            self.emit(DriverEvent::GameOver(summary));
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tetris_engine_core::{Board, SessionSnapshot, SimpleRng, Tetromino};
    use tetris_engine_store::MemoryStore;
    use tetris_engine_types::{Block, ColorPalette, Difficulty, PieceKind, Rotation};

    fn config() -> DriverConfig {
        DriverConfig {
            seed: Some(2024),
            ..DriverConfig::default()
        }
    }

    fn filled_except(rows: std::ops::Range<i8>, gap: i8) -> Board {
        let mut board = Board::new();
        let block = Some(Block::new(PieceKind::O, ColorPalette::Palette1));
        for y in rows {
            for x in 0..10 {
                if x != gap {
                    board.set(x, y, block);
                }
            }
        }
        board
    }

    fn snapshot(board: Board, current: Tetromino, tetris_count: u32) -> SessionSnapshot {
        SessionSnapshot {
            board,
            current_piece: Some(current),
            next_queue: vec![PieceKind::T, PieceKind::T, PieceKind::T],
            held_piece: None,
            can_hold: true,
            rng: SimpleRng::new(5),
            score: 0,
            level: 1,
            rows_cleared: 0,
            combo_count: 0,
            max_combo: 0,
            tetris_count,
            difficulty: Difficulty::Default,
            color_palette: ColorPalette::Palette1,
            active_play_time_ms: 0,
        }
    }

    async fn resumed(store: &MemoryStore, saved: SessionSnapshot) -> Driver<MemoryStore> {
        let storage = Storage::new(store.clone());
        storage.save_game(&saved).await;
        let config = DriverConfig {
            resume: true,
            ..config()
        };
        Driver::load(storage, &config).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_starts_and_saves() {
        let store = MemoryStore::new();
        let driver = Driver::load(Storage::new(store.clone()), &config()).await;

        assert!(driver.session().is_running());
        assert!(driver.next_tick().is_some());
        let saved = Storage::new(store).load_saved_game().await;
        assert_eq!(saved, Some(driver.session().snapshot()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_disarms_tick() {
        let mut driver = Driver::load(Storage::new(MemoryStore::new()), &config()).await;
        assert!(driver.pause().await);
        assert!(driver.next_tick().is_none());
        assert!(!driver.handle_action(GameAction::MoveLeft).await);

        assert!(driver.handle_action(GameAction::TogglePause).await);
        assert!(driver.next_tick().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_twice_records_once() {
        let store = MemoryStore::new();
        let mut driver = Driver::load(Storage::new(store.clone()), &config()).await;

        tokio::time::advance(Duration::from_millis(1_500)).await;
        let first = driver.shutdown().await.unwrap();
        let second = driver.shutdown().await.unwrap();
        assert_eq!(first, second);
        assert!(!first.game_over);

        let storage = Storage::new(store);
        assert_eq!(storage.load_stats().await.total_games_played, 1);
        assert!(storage.load_saved_game().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_out_finalizes_and_clears_saved_game() {
        let store = MemoryStore::new();
        let stuck = Tetromino {
            kind: PieceKind::O,
            rotation: Rotation::North,
            x: 0,
            y: -2,
        };
        let mut driver = resumed(&store, snapshot(filled_except(0..20, 0), stuck, 0)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        driver = driver.with_events(tx);

        assert!(driver.on_tick().await);
        assert!(driver.session().is_game_over());
        assert!(driver.next_tick().is_none());
        assert!(matches!(rx.try_recv(), Ok(DriverEvent::GameOver(s)) if s.game_over));

        let storage = Storage::new(store);
        assert_eq!(storage.load_stats().await.total_games_played, 1);
        assert!(storage.load_saved_game().await.is_none());

        // Teardown after game over must not count the run again.
        driver.shutdown().await;
        assert_eq!(storage.load_stats().await.total_games_played, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_tetris_unlocks_board_master() {
        let store = MemoryStore::new();
        let vertical_i = Tetromino {
            kind: PieceKind::I,
            rotation: Rotation::East,
            x: 2,
            y: 0,
        };
        let mut driver = resumed(&store, snapshot(filled_except(16..20, 4), vertical_i, 1)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        driver = driver.with_events(tx);

        assert!(driver.handle_action(GameAction::HardDrop).await);
        assert_eq!(driver.session().tetris_count(), 2);

        let events: Vec<DriverEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(
            events[0],
            DriverEvent::LineClear {
                clear: LineClear::Tetris,
                ..
            }
        ));
        assert_eq!(
            events[1],
            DriverEvent::AchievementUnlocked(AchievementId::BoardMaster)
        );

        let record = Storage::new(store).load_achievements().await;
        assert!(record.is_unlocked(AchievementId::BoardMaster));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_exit() {
        let store = MemoryStore::new();
        let driver = Driver::load(Storage::new(store.clone()), &config()).await;
        let start_y = driver.session().current().unwrap().y;
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(driver.run(rx));

        // Two gravity steps at level 1 (760 ms each).
        tokio::time::sleep(Duration::from_millis(1_600)).await;
        let saved = Storage::new(store.clone()).load_saved_game().await.unwrap();
        assert_eq!(saved.current_piece.unwrap().y, start_y + 2);

        tx.send(Command::Pause).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send(Command::Exit).await.unwrap();

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.play_time_ms, 1_600);
        assert_eq!(
            Storage::new(store).load_stats().await.total_games_played,
            1
        );
    }
}
