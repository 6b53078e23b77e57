//! Session module - the run state machine
//!
//! Ties together board, placement, scoring and the piece roller. A session moves
//! through `Loading → Running ⇄ Paused → GameOver`. Every tick or player action
//! mutates it synchronously; time is supplied by the caller as monotonic
//! milliseconds so the session itself never reads a clock.

use std::collections::VecDeque;
use std::time::Duration;

use crate::achievements::RunStats;
use crate::board::Board;
use crate::placement::{
    drop_distance, ghost_position, is_valid_placement, lock_piece, try_rotate, Tetromino,
};
use crate::rng::SimpleRng;
use crate::scoring::{calculate_level, calculate_score, tick_interval, LineClear};
use crate::snapshot::SessionSnapshot;
use crate::view::SessionView;
use crate::types::{
    ColorPalette, Difficulty, GameAction, PieceKind, LINE_CLEAR_BANNER_MS, NEXT_QUEUE_LEN,
};

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Created or restored, waiting for `start`
    Loading,
    Running,
    Paused,
    /// Terminal
    GameOver,
}

/// Emitted after every lock (consumed by the driver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub points: u32,
    pub combo: u32,
    pub line_clear: Option<LineClear>,
    pub game_over: bool,
}

impl LockEvent {
    pub fn is_tetris(&self) -> bool {
        self.line_clear == Some(LineClear::Tetris)
    }
}

/// Final numbers of a session, produced once by [`Session::finalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub level: u32,
    pub rows_cleared: u32,
    /// Longest clearing streak reached during the run
    pub best_combo: u32,
    pub tetris_count: u32,
    pub difficulty: Difficulty,
    pub play_time_ms: u64,
    /// True when the run ended by topping out rather than being abandoned
    pub game_over: bool,
}

impl RunSummary {
    pub fn run_stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            level: self.level,
            rows_cleared: self.rows_cleared,
            difficulty: self.difficulty,
            combo: self.best_combo,
            tetris_count: self.tetris_count,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    current: Option<Tetromino>,
    next_queue: VecDeque<PieceKind>,
    held: Option<PieceKind>,
    can_hold: bool,
    rng: SimpleRng,
    score: u32,
    level: u32,
    rows_cleared: u32,
    combo: u32,
    max_combo: u32,
    tetris_count: u32,
    difficulty: Difficulty,
    palette: ColorPalette,
    phase: SessionPhase,
    active_play_ms: u64,
    /// Reference time for elapsed-play accounting; None while the clock is stopped.
    clock_ref_ms: Option<u64>,
    /// Most recent named clear and when it happened.
    last_line_clear: Option<(LineClear, u64)>,
    last_event: Option<LockEvent>,
    finalized: bool,
}

impl Session {
    /// Create a new session with an empty board and freshly rolled pieces
    pub fn new(difficulty: Difficulty, palette: ColorPalette, seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let current = Tetromino::spawn(rng.roll_piece());
        let next_queue = (0..NEXT_QUEUE_LEN).map(|_| rng.roll_piece()).collect();

        Self {
            board: Board::new(),
            current: Some(current),
            next_queue,
            held: None,
            can_hold: true,
            rng,
            score: 0,
            level: calculate_level(0),
            rows_cleared: 0,
            combo: 0,
            max_combo: 0,
            tetris_count: 0,
            difficulty,
            palette,
            phase: SessionPhase::Loading,
            active_play_ms: 0,
            clock_ref_ms: None,
            last_line_clear: None,
            last_event: None,
            finalized: false,
        }
    }

    /// Rebuild a session from a saved-game snapshot
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let mut session = Self {
            board: snapshot.board,
            // Damaged records can hold unreachable positions.
            current: snapshot.current_piece.map(|piece| {
                if piece.is_near_board() {
                    piece
                } else {
                    Tetromino::spawn(piece.kind)
                }
            }),
            next_queue: snapshot.next_queue.into_iter().collect(),
            held: snapshot.held_piece,
            can_hold: snapshot.can_hold,
            rng: snapshot.rng,
            score: snapshot.score,
            level: calculate_level(snapshot.rows_cleared),
            rows_cleared: snapshot.rows_cleared,
            combo: snapshot.combo_count,
            max_combo: snapshot.max_combo.max(snapshot.combo_count),
            tetris_count: snapshot.tetris_count,
            difficulty: snapshot.difficulty,
            palette: snapshot.color_palette,
            phase: SessionPhase::Loading,
            active_play_ms: snapshot.active_play_time_ms,
            clock_ref_ms: None,
            last_line_clear: None,
            last_event: None,
            finalized: false,
        };
        while session.next_queue.len() < NEXT_QUEUE_LEN {
            let kind = session.rng.roll_piece();
            session.next_queue.push_back(kind);
        }
        if session.current.is_none() {
            session.spawn_next();
        }
        session
    }

    /// Serializable copy of the persistent part of the state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.clone(),
            current_piece: self.current,
            next_queue: self.next_queue.iter().copied().collect(),
            held_piece: self.held,
            can_hold: self.can_hold,
            rng: self.rng.clone(),
            score: self.score,
            level: self.level,
            rows_cleared: self.rows_cleared,
            combo_count: self.combo,
            max_combo: self.max_combo,
            tetris_count: self.tetris_count,
            difficulty: self.difficulty,
            color_palette: self.palette,
            active_play_time_ms: self.active_play_ms,
        }
    }

    /// Leave the loading phase and start the play clock
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Loading {
            return false;
        }
        if !self
            .current
            .is_some_and(|piece| is_valid_placement(&self.board, &piece))
        {
            self.enter_game_over();
            return false;
        }
        self.phase = SessionPhase::Running;
        self.clock_ref_ms = Some(now_ms);
        true
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<Tetromino> {
        self.current
    }

    pub fn next_queue(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.next_queue.iter().copied()
    }

    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rows_cleared(&self) -> u32 {
        self.rows_cleared
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn tetris_count(&self) -> u32 {
        self.tetris_count
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn palette(&self) -> ColorPalette {
        self.palette
    }

    /// Active play time, including time since the last tick while running
    pub fn play_time_ms(&self, now_ms: u64) -> u64 {
        let pending = self
            .clock_ref_ms
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.active_play_ms + pending
    }

    /// Gravity interval for the current level and difficulty
    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.level, self.difficulty)
    }

    /// Where the current piece would land on a hard drop
    pub fn ghost(&self) -> Option<Tetromino> {
        self.current.map(|piece| ghost_position(&self.board, &piece))
    }

    /// Name of the most recent clear while it is still on display
    pub fn line_clear_banner(&self, now_ms: u64) -> Option<&'static str> {
        let (clear, at) = self.last_line_clear?;
        (now_ms.saturating_sub(at) < LINE_CLEAR_BANNER_MS).then(|| clear.name())
    }

    /// Read-only view for presentation
    pub fn view(&self, now_ms: u64) -> SessionView<'_> {
        SessionView::new(self, now_ms)
    }

    /// Stats of the run so far, as seen by the achievement evaluator
    pub fn run_stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            level: self.level,
            rows_cleared: self.rows_cleared,
            difficulty: self.difficulty,
            combo: self.combo,
            tetris_count: self.tetris_count,
        }
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    fn flush_clock(&mut self, now_ms: u64) {
        if let Some(since) = self.clock_ref_ms {
            self.active_play_ms += now_ms.saturating_sub(since);
            self.clock_ref_ms = Some(now_ms);
        }
    }

    fn stop_clock(&mut self, now_ms: u64) {
        self.flush_clock(now_ms);
        self.clock_ref_ms = None;
    }

    fn enter_game_over(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.current = None;
    }

    /// Gravity step: move down one row, or lock and spawn when blocked.
    ///
    /// Returns true if the state changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.flush_clock(now_ms);

        if self.move_by(0, 1) {
            return true;
        }
        self.lock_and_spawn(None, now_ms);
        true
    }

    /// Try to move the current piece. A blocked move is a no-op and never locks.
    pub fn move_by(&mut self, dx: i8, dy: i8) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let candidate = piece.translated(dx, dy);
        if is_valid_placement(&self.board, &candidate) {
            self.current = Some(candidate);
            return true;
        }
        false
    }

    /// Rotate clockwise, kicking one column left or right if needed
    pub fn rotate(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        match try_rotate(&piece, |candidate| is_valid_placement(&self.board, candidate)) {
            Some(rotated) => {
                self.current = Some(rotated);
                true
            }
            None => false,
        }
    }

    /// Drop to the lowest valid row and lock immediately
    pub fn hard_drop(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let distance = drop_distance(&self.board, &piece);
        self.current = Some(ghost_position(&self.board, &piece));
        self.lock_and_spawn(Some(distance), now_ms);
        true
    }

    /// Swap with the held piece, or stash the current piece and take the next one
    pub fn hold(&mut self) -> bool {
        if self.phase != SessionPhase::Running || !self.can_hold {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        match self.held.replace(piece.kind) {
            Some(held_kind) => {
                let swapped = Tetromino::spawn(held_kind);
                if is_valid_placement(&self.board, &swapped) {
                    self.current = Some(swapped);
                } else {
                    self.enter_game_over();
                }
            }
            None => {
                self.spawn_next();
            }
        }

        self.can_hold = false;
        true
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.stop_clock(now_ms);
        self.phase = SessionPhase::Paused;
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.clock_ref_ms = Some(now_ms);
        self.phase = SessionPhase::Running;
        true
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> bool {
        match self.phase {
            SessionPhase::Running => self.pause(now_ms),
            SessionPhase::Paused => self.resume(now_ms),
            _ => false,
        }
    }

    /// Apply a player action
    pub fn apply_action(&mut self, action: GameAction, now_ms: u64) -> bool {
        match action {
            GameAction::MoveLeft => self.move_by(-1, 0),
            GameAction::MoveRight => self.move_by(1, 0),
            GameAction::MoveDown => self.move_by(0, 1),
            GameAction::Rotate => self.rotate(),
            GameAction::HardDrop => self.hard_drop(now_ms),
            GameAction::Hold => self.hold(),
            GameAction::TogglePause => self.toggle_pause(now_ms),
        }
    }

    /// Close the session and report its final numbers.
    ///
    /// Returns None if the session was already finalized.
    pub fn finalize(&mut self, now_ms: u64) -> Option<RunSummary> {
        if self.finalized {
            return None;
        }
        self.finalized = true;
        self.stop_clock(now_ms);

        Some(RunSummary {
            score: self.score,
            level: self.level,
            rows_cleared: self.rows_cleared,
            best_combo: self.max_combo,
            tetris_count: self.tetris_count,
            difficulty: self.difficulty,
            play_time_ms: self.active_play_ms,
            game_over: self.phase == SessionPhase::GameOver,
        })
    }

    /// Promote the head of the queue, roll a replacement, and check for top-out.
    fn spawn_next(&mut self) -> bool {
        let kind = match self.next_queue.pop_front() {
            Some(kind) => kind,
            None => self.rng.roll_piece(),
        };
        let rolled = self.rng.roll_piece();
        self.next_queue.push_back(rolled);

        let piece = Tetromino::spawn(kind);
        if !is_valid_placement(&self.board, &piece) {
            self.enter_game_over();
            return false;
        }
        self.current = Some(piece);
        self.can_hold = true;
        true
    }

    /// Lock the current piece, clear rows, score, and spawn the next piece.
    fn lock_and_spawn(&mut self, hard_drop: Option<u32>, now_ms: u64) {
        let Some(piece) = self.current.take() else {
            return;
        };

        let locked = lock_piece(&self.board, &piece, self.palette);
        let (board, lines) = locked.cleared();
        self.board = board;

        let result = calculate_score(
            lines,
            self.level,
            hard_drop.is_some(),
            hard_drop.unwrap_or(0),
            self.combo,
        );
        self.score = self.score.saturating_add(result.total);

        let line_clear = LineClear::from_lines(lines);
        if lines > 0 {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            self.rows_cleared += lines as u32;
            if lines == 4 {
                self.tetris_count += 1;
            }
            if let Some(clear) = line_clear {
                self.last_line_clear = Some((clear, now_ms));
            }
        } else {
            self.combo = 0;
        }
        self.level = calculate_level(self.rows_cleared);

        let spawned = self.spawn_next();
        if !spawned {
            self.stop_clock(now_ms);
        }

        self.last_event = Some(LockEvent {
            lines_cleared: lines as u32,
            points: result.total,
            combo: self.combo,
            line_clear,
            game_over: !spawned,
        });
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_current(&mut self, piece: Tetromino) {
        self.current = Some(piece);
    }
}
