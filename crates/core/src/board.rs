//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty or holds a locked block.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use serde::{Deserialize, Serialize};

use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The game board - 10 columns x 20 rows using flat array storage
///
/// Serialized as a list of rows so saved games stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Copy of this board with one cell replaced.
    ///
    /// Out-of-bounds coordinates return an unchanged copy.
    pub fn with_cell(&self, x: i8, y: i8, cell: Cell) -> Board {
        let mut next = self.clone();
        next.set(x, y, cell);
        next
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Remove every full row at once and let the rest fall.
    ///
    /// Remaining rows keep their relative order and empty rows are inserted at
    /// the top. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let width = BOARD_WIDTH as usize;
        let mut cleared = 0usize;
        let mut write_y = BOARD_HEIGHT as usize;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared += 1;
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        cleared
    }

    /// Value-semantics variant of [`Board::clear_full_rows`]
    pub fn cleared(&self) -> (Board, usize) {
        let mut next = self.clone();
        let count = next.clear_full_rows();
        (next, count)
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(BOARD_WIDTH as usize)
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Board> for Vec<Vec<Cell>> {
    fn from(board: Board) -> Self {
        board.rows().map(|row| row.to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        if rows.len() != BOARD_HEIGHT as usize {
            return Err(format!(
                "expected {} rows, found {}",
                BOARD_HEIGHT,
                rows.len()
            ));
        }
        let mut board = Board::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != BOARD_WIDTH as usize {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    BOARD_WIDTH
                ));
            }
            let start = y * BOARD_WIDTH as usize;
            board.cells[start..start + row.len()].copy_from_slice(row);
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Block, ColorPalette, PieceKind};

    fn block(kind: PieceKind) -> Cell {
        Some(Block::new(kind, ColorPalette::Palette1))
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_with_cell_leaves_source_untouched() {
        let board = Board::new();
        let next = board.with_cell(4, 7, block(PieceKind::T));

        assert_eq!(board.get(4, 7), Some(None));
        assert_eq!(next.get(4, 7), Some(block(PieceKind::T)));
        assert_eq!(board.with_cell(-1, 0, block(PieceKind::T)), board);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::new();
        for x in 0..BOARD_WIDTH as i8 {
            board.set(x, 19, block(PieceKind::I));
            board.set(x, 17, block(PieceKind::I));
        }
        board.set(2, 18, block(PieceKind::T));
        board.set(5, 16, block(PieceKind::S));

        let cleared = board.clear_full_rows();

        assert_eq!(cleared, 2);
        assert_eq!(board.get(2, 19), Some(block(PieceKind::T)));
        assert_eq!(board.get(5, 18), Some(block(PieceKind::S)));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_serde_rejects_wrong_dimensions() {
        let board = Board::new().with_cell(0, 19, block(PieceKind::O));
        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);

        let short: Result<Board, _> = serde_json::from_str("[[null]]");
        assert!(short.is_err());
    }
}
