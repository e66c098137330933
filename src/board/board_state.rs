//! Mover-normalized 8x8 board grid.
//!
//! Every `Board` is stored from the perspective of the side about to move:
//! that side owns every piece with the owner bit set and advances toward
//! row 0. There is no separate "whose turn" field; passing the turn is the
//! pure `swap_perspective` transform.

use crate::board::piece_codes::*;

pub const BOARD_SIZE: usize = 8;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Row the side to move promotes on.
pub const TERMINAL_ROW: usize = 0;
/// Row the side to move starts its pawns on.
pub const PAWN_START_ROW: usize = 6;

/// Raw cell grid, `cells[row][col]`.
pub type Grid = [[u8; BOARD_SIZE]; BOARD_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: Grid,
}

/// An active-owned piece and where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub code: u8,
    pub x: usize,
    pub y: usize,
}

impl Board {
    #[inline]
    pub const fn from_cells(cells: Grid) -> Self {
        Self { cells }
    }

    #[inline]
    pub const fn empty() -> Self {
        Self {
            cells: [[EMPTY; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Standard opening layout with the side to move on rows 6 and 7.
    pub const fn initial() -> Self {
        const P: u8 = PAWN;
        const A: u8 = ACTIVE;
        Self {
            cells: [
                [
                    ROOK | AUX_FLAG,
                    KNIGHT,
                    BISHOP,
                    QUEEN,
                    KING | AUX_FLAG,
                    BISHOP,
                    KNIGHT,
                    ROOK | AUX_FLAG,
                ],
                [P, P, P, P, P, P, P, P],
                [EMPTY; BOARD_SIZE],
                [EMPTY; BOARD_SIZE],
                [EMPTY; BOARD_SIZE],
                [EMPTY; BOARD_SIZE],
                [P | A, P | A, P | A, P | A, P | A, P | A, P | A, P | A],
                [
                    ROOK | A | AUX_FLAG,
                    KNIGHT | A,
                    BISHOP | A,
                    QUEEN | A,
                    KING | A | AUX_FLAG,
                    BISHOP | A,
                    KNIGHT | A,
                    ROOK | A | AUX_FLAG,
                ],
            ],
        }
    }

    #[inline]
    pub const fn cells(&self) -> &Grid {
        &self.cells
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y][x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, code: u8) {
        self.cells[y][x] = code;
    }

    /// Cell at `(x + dx, y + dy)`, or `None` when it falls off the board.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dx: i8, dy: i8) -> Option<u8> {
        let (tx, ty) = offset_position(x, y, dx, dy)?;
        Some(self.cells[ty][tx])
    }

    /// Flip ownership of every occupied cell and rotate the grid 180 degrees,
    /// handing the move to the other side.
    pub fn swap_perspective(&self) -> Self {
        let mut out = Self::empty();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let flipped = if code == EMPTY { EMPTY } else { code ^ ACTIVE };
                out.cells[BOARD_SIZE - 1 - y][BOARD_SIZE - 1 - x] = flipped;
            }
        }
        out
    }

    /// Active-owned pieces in row-major order.
    pub fn active_pieces(&self) -> impl Iterator<Item = Placement> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, &code)| {
                is_active_piece(code).then_some(Placement { code, x, y })
            })
        })
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&code| code & TYPE_MASK != 0)
            .count()
    }

    /// First cell holding a piece matching `pred`, as `(x, y)`.
    pub fn find(&self, pred: impl Fn(u8) -> bool) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(y, row)| {
            row.iter().position(|&code| pred(code)).map(|x| (x, y))
        })
    }

    /// Both sides still have a king. A captured king ends the game.
    pub fn has_both_kings(&self) -> bool {
        self.find(is_active_king).is_some() && self.find(is_inactive_king).is_some()
    }

    /// Content address: the 64 grid bytes, row-major.
    pub fn to_bytes(&self) -> [u8; CELL_COUNT] {
        let mut out = [0u8; CELL_COUNT];
        for (chunk, row) in out.chunks_exact_mut(BOARD_SIZE).zip(self.cells.iter()) {
            chunk.copy_from_slice(row);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; CELL_COUNT]) -> Self {
        let mut cells = [[EMPTY; BOARD_SIZE]; BOARD_SIZE];
        for (row, chunk) in cells.iter_mut().zip(bytes.chunks_exact(BOARD_SIZE)) {
            row.copy_from_slice(chunk);
        }
        Self { cells }
    }
}

#[inline]
pub fn offset_position(x: usize, y: usize, dx: i8, dy: i8) -> Option<(usize, usize)> {
    let tx = x as i32 + dx as i32;
    let ty = y as i32 + dy as i32;
    let range = 0..BOARD_SIZE as i32;
    if range.contains(&tx) && range.contains(&ty) {
        Some((tx as usize, ty as usize))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_board_matches_reference_layout() {
        let board = Board::initial();
        assert_eq!(board.cells()[0], [28, 6, 2, 10, 20, 2, 6, 28]);
        assert_eq!(board.cells()[1], [8; 8]);
        assert_eq!(board.cells()[6], [9; 8]);
        assert_eq!(board.cells()[7], [29, 7, 3, 11, 21, 3, 7, 29]);
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.active_pieces().count(), 16);
        assert!(board.has_both_kings());
    }

    #[test]
    fn swap_is_an_involution() {
        let board = Board::initial();
        let swapped = board.swap_perspective();
        assert_ne!(board, swapped);
        assert_eq!(swapped.swap_perspective(), board);
    }

    #[test]
    fn swap_of_initial_board_exchanges_king_and_queen_files() {
        let swapped = Board::initial().swap_perspective();
        assert_eq!(swapped.get(3, 7), KING | ACTIVE | AUX_FLAG);
        assert_eq!(swapped.get(4, 7), QUEEN | ACTIVE);
        assert_eq!(swapped.get(3, 0), KING | AUX_FLAG);
        assert_eq!(swapped.active_pieces().count(), 16);
    }

    #[test]
    fn bytes_round_trip() {
        let board = Board::initial();
        let bytes = board.to_bytes();
        assert_eq!(&bytes[..8], &[28, 6, 2, 10, 20, 2, 6, 28]);
        assert_eq!(Board::from_bytes(&bytes), board);
    }

    #[test]
    fn offset_rejects_off_board_targets() {
        let board = Board::initial();
        assert_eq!(board.offset(0, 0, -1, 0), None);
        assert_eq!(board.offset(7, 7, 1, 1), None);
        assert_eq!(board.offset(0, 7, 0, -1), Some(PAWN | ACTIVE));
    }
}
