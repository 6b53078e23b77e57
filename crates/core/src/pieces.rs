//! Pieces module - Tetromino shape matrices and rotation
//!
//! Every piece has one canonical square matrix (side 2-4). Rotated shapes are
//! always recomputed from that matrix by applying clockwise quarter turns, so
//! repeated rotation can never drift.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Rotation, BOARD_WIDTH};

/// Offset of a single mino relative to the top-left of the bounding box (col, row)
pub type MinoOffset = (i8, i8);

/// Horizontal offsets tried, in order, when a rotation collides
pub const KICK_OFFSETS: [i8; 3] = [0, -1, 1];

/// Square 0/1 matrix describing a piece in one rotation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: u8,
    rows: [[u8; 4]; 4],
}

impl ShapeMatrix {
    const fn from_rows(size: u8, rows: [[u8; 4]; 4]) -> Self {
        Self { size, rows }
    }

    /// Side length of the bounding box
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether the cell at (row, col) is filled. Out of range reads as empty.
    pub fn get(&self, row: usize, col: usize) -> bool {
        let size = self.size as usize;
        row < size && col < size && self.rows[row][col] != 0
    }

    /// Matrix rows trimmed to the bounding-box size
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let size = self.size as usize;
        self.rows[..size].iter().map(move |row| &row[..size])
    }

    /// Filled cells as (col, row) offsets, top to bottom, left to right
    pub fn cells(&self) -> ArrayVec<MinoOffset, 4> {
        let mut out = ArrayVec::new();
        let size = self.size as usize;
        for row in 0..size {
            for col in 0..size {
                if self.rows[row][col] != 0 && !out.is_full() {
                    out.push((col as i8, row as i8));
                }
            }
        }
        out
    }

    /// Rows from the top of the bounding box down to the lowest filled cell
    pub fn filled_height(&self) -> u8 {
        self.cells()
            .iter()
            .map(|&(_, row)| row as u8 + 1)
            .max()
            .unwrap_or(0)
    }

    /// One clockwise quarter turn: new[r][c] = old[size - 1 - c][r]
    fn rotated_cw(&self) -> Self {
        let size = self.size as usize;
        let mut rows = [[0u8; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate().take(size) {
            for (c, cell) in row.iter_mut().enumerate().take(size) {
                *cell = self.rows[size - 1 - c][r];
            }
        }
        Self {
            size: self.size,
            rows,
        }
    }
}

const I_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    4,
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const J_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    3,
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const L_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    3,
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const O_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const S_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    3,
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const T_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    3,
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const Z_MATRIX: ShapeMatrix = ShapeMatrix::from_rows(
    3,
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

/// Canonical (spawn orientation) matrix for a piece kind
pub fn canonical_matrix(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::I => I_MATRIX,
        PieceKind::J => J_MATRIX,
        PieceKind::L => L_MATRIX,
        PieceKind::O => O_MATRIX,
        PieceKind::S => S_MATRIX,
        PieceKind::T => T_MATRIX,
        PieceKind::Z => Z_MATRIX,
    }
}

/// Get the shape matrix for a piece kind and rotation
pub fn shape_matrix(kind: PieceKind, rotation: Rotation) -> ShapeMatrix {
    let mut matrix = canonical_matrix(kind);
    for _ in 0..rotation.turns() {
        matrix = matrix.rotated_cw();
    }
    matrix
}

/// Spawn position (x, y) of the bounding box: horizontally centered, top row
pub fn spawn_position(kind: PieceKind) -> (i8, i8) {
    let size = canonical_matrix(kind).size() as i8;
    (BOARD_WIDTH as i8 / 2 - size / 2, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(matrix: &ShapeMatrix) -> Vec<Vec<u8>> {
        matrix.rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_t_rotates_clockwise() {
        let east = shape_matrix(PieceKind::T, Rotation::East);
        assert_eq!(rows_of(&east), vec![vec![0, 1, 0], vec![0, 1, 1], vec![0, 1, 0]]);

        let south = shape_matrix(PieceKind::T, Rotation::South);
        assert_eq!(rows_of(&south), vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 1, 0]]);
    }

    #[test]
    fn test_i_vertical_after_one_turn() {
        let east = shape_matrix(PieceKind::I, Rotation::East);
        assert_eq!(east.cells().as_slice(), &[(2, 0), (2, 1), (2, 2), (2, 3)]);
        assert_eq!(east.filled_height(), 4);
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            for turns in 0..4 {
                let m = shape_matrix(kind, Rotation::from_turns(turns));
                assert_eq!(m.cells().len(), 4, "{:?} turn {}", kind, turns);
            }
        }
    }

    #[test]
    fn test_spawn_positions_are_centered() {
        assert_eq!(spawn_position(PieceKind::I), (3, 0));
        assert_eq!(spawn_position(PieceKind::O), (4, 0));
        assert_eq!(spawn_position(PieceKind::T), (4, 0));
    }
}
