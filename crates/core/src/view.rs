use crate::board::Board;
use crate::pieces::{shape_matrix, ShapeMatrix};
use crate::placement::Tetromino;
use crate::session::Session;
use crate::types::{Block, Cell, ColorPalette, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// A piece as shown to the player: shape, color and (for placed pieces) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceView {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: &'static str,
    pub x: i8,
    pub y: i8,
}

impl PieceView {
    fn placed(piece: Tetromino, palette: ColorPalette) -> Self {
        Self {
            kind: piece.kind,
            shape: piece.shape(),
            color: palette.color(piece.kind),
            x: piece.x,
            y: piece.y,
        }
    }

    /// Preview of a piece outside the board (queue or hold slot)
    fn preview(kind: PieceKind, palette: ColorPalette) -> Self {
        Self {
            kind,
            shape: shape_matrix(kind, Rotation::North),
            color: palette.color(kind),
            x: 0,
            y: 0,
        }
    }
}

/// Read-only view of a session for presentation layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView<'a> {
    pub board: &'a Board,
    pub palette: ColorPalette,
    pub active: Option<PieceView>,
    pub ghost: Option<PieceView>,
    pub next: Vec<PieceView>,
    pub held: Option<PieceView>,
    pub can_hold: bool,
    pub score: u32,
    pub level: u32,
    pub rows_cleared: u32,
    pub combo: u32,
    pub play_time_ms: u64,
    pub paused: bool,
    pub game_over: bool,
    pub line_clear: Option<&'static str>,
}

impl<'a> SessionView<'a> {
    pub fn new(session: &'a Session, now_ms: u64) -> Self {
        let palette = session.palette();
        Self {
            board: session.board(),
            palette,
            active: session.current().map(|p| PieceView::placed(p, palette)),
            ghost: session.ghost().map(|p| PieceView::placed(p, palette)),
            next: session
                .next_queue()
                .map(|kind| PieceView::preview(kind, palette))
                .collect(),
            held: session.held().map(|kind| PieceView::preview(kind, palette)),
            can_hold: session.can_hold(),
            score: session.score(),
            level: session.level(),
            rows_cleared: session.rows_cleared(),
            combo: session.combo(),
            play_time_ms: session.play_time_ms(now_ms),
            paused: session.is_paused(),
            game_over: session.is_game_over(),
            line_clear: session.line_clear_banner(now_ms),
        }
    }

    /// Board rows with the active piece drawn in (cells above the top are skipped)
    pub fn composed_rows(&self) -> [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize] {
        let mut grid = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (y, row) in self.board.rows().enumerate() {
            grid[y].copy_from_slice(row);
        }

        if let Some(active) = self.active {
            let block = Some(Block::new(active.kind, self.palette));
            for (dx, dy) in active.shape.cells() {
                let (x, y) = (active.x + dx, active.y + dy);
                if (0..BOARD_WIDTH as i8).contains(&x) && (0..BOARD_HEIGHT as i8).contains(&y) {
                    grid[y as usize][x as usize] = block;
                }
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    #[test]
    fn test_view_reflects_session() {
        let mut session = Session::new(Difficulty::Default, ColorPalette::Palette2, 77);
        session.start(0);

        let view = SessionView::new(&session, 0);
        let active = view.active.unwrap();
        assert_eq!(active.color, ColorPalette::Palette2.color(active.kind));
        assert_eq!(view.next.len(), 3);
        assert!(view.held.is_none());
        assert!(!view.paused && !view.game_over);
        assert_eq!(view.ghost.unwrap().x, active.x);
        assert!(view.ghost.unwrap().y >= active.y);

        session.hold();
        let view = SessionView::new(&session, 0);
        assert_eq!(view.held.unwrap().kind, active.kind);
        assert!(!view.can_hold);
    }

    #[test]
    fn test_composed_rows_draw_active_piece() {
        let mut session = Session::new(Difficulty::Default, ColorPalette::Palette1, 5);
        session.start(0);
        let view = SessionView::new(&session, 0);
        let active = view.active.unwrap();

        let grid = view.composed_rows();
        let drawn = grid.iter().flatten().filter(|cell| cell.is_some()).count();
        assert_eq!(drawn, 4);
        for (dx, dy) in active.shape.cells() {
            let cell = grid[(active.y + dy) as usize][(active.x + dx) as usize];
            assert_eq!(cell.map(|b| b.kind), Some(active.kind));
        }
    }
}
