//! Placement module - collision checks, locking, drop distance and kicks
//!
//! A piece position is the top-left corner of its shape matrix. Cells above the
//! visible board (negative rows) are allowed so pieces can spawn partially
//! hidden; they are still bound by the side walls.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::pieces::{shape_matrix, spawn_position, MinoOffset, ShapeMatrix, KICK_OFFSETS};
use crate::types::{Block, ColorPalette, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at its spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        let (x, y) = spawn_position(kind);
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Shape matrix for the current rotation
    pub fn shape(&self) -> ShapeMatrix {
        shape_matrix(self.kind, self.rotation)
    }

    /// Board coordinates of every filled cell
    pub fn board_cells(&self) -> impl Iterator<Item = MinoOffset> {
        let (x, y) = (self.x, self.y);
        self.shape()
            .cells()
            .into_iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }

    pub fn translated(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Whether the matrix origin lies in the window pieces can legally reach
    ///
    /// Positions outside it only come from damaged saved games.
    pub fn is_near_board(&self) -> bool {
        let reach = 4;
        (-reach..BOARD_WIDTH as i8).contains(&self.x)
            && (-reach..BOARD_HEIGHT as i8).contains(&self.y)
    }

    pub fn rotated_cw(&self) -> Self {
        Self {
            rotation: self.rotation.rotate_cw(),
            ..*self
        }
    }
}

/// Check whether every filled cell of the piece sits on a legal board cell.
///
/// Rejects cells outside the side walls, at or below the floor, or overlapping
/// a locked block. Cells above the top edge skip the occupancy check.
pub fn is_valid_placement(board: &Board, piece: &Tetromino) -> bool {
    piece.board_cells().all(|(x, y)| {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return false;
        }
        y < 0 || !board.is_occupied(x, y)
    })
}

/// Merge the piece into a copy of the board.
///
/// Cells above the top edge are dropped.
pub fn lock_piece(board: &Board, piece: &Tetromino, palette: ColorPalette) -> Board {
    let mut next = board.clone();
    let block = Block::new(piece.kind, palette);
    for (x, y) in piece.board_cells() {
        if y >= 0 {
            next.set(x, y, Some(block));
        }
    }
    next
}

/// How many rows the piece can fall before it would collide.
pub fn drop_distance(board: &Board, piece: &Tetromino) -> u32 {
    (i32::from(ghost_position(board, piece).y) - i32::from(piece.y)) as u32
}

/// Position a hard drop would land the piece at
///
/// Computed by stepping one row at a time, not analytically.
pub fn ghost_position(board: &Board, piece: &Tetromino) -> Tetromino {
    let mut landed = *piece;
    while let Some(y) = landed.y.checked_add(1) {
        let candidate = Tetromino { y, ..landed };
        if !is_valid_placement(board, &candidate) {
            break;
        }
        landed = candidate;
    }
    landed
}

/// Try to rotate a piece clockwise with wall kicks
///
/// Tries the rotated shape in place, then one column left, then one column right.
/// Returns the first valid candidate, or None if all kicks fail.
pub fn try_rotate(
    piece: &Tetromino,
    is_valid: impl Fn(&Tetromino) -> bool,
) -> Option<Tetromino> {
    let rotated = piece.rotated_cw();
    KICK_OFFSETS
        .iter()
        .map(|&dx| rotated.translated(dx, 0))
        .find(|candidate| is_valid(candidate))
}
