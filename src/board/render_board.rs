//! Emoji board renderer.
//!
//! Produces the display form stored alongside each frontier node. Glyphs are
//! chosen by the low nibble of the cell so the side to move always shows as
//! the outlined set.

use crate::board::board_state::Board;
use crate::board::piece_codes::{EMPTY, LOW_NIBBLE};

const GLYPHS: [char; 16] = [
    '⌛', '‼', '♝', '♗', '♚', '♔', '♞', '♘', '♟', '♙', '♛', '♕', '♜', '♖', '▪', '▫',
];

/// Render one line per row, without a trailing newline.
pub fn render_board(board: &Board) -> String {
    let mut out = String::with_capacity(8 * 9 * 3);

    for (y, row) in board.cells().iter().enumerate() {
        if y > 0 {
            out.push('\n');
        }
        for (x, &code) in row.iter().enumerate() {
            out.push(glyph(code, x, y));
        }
    }

    out
}

fn glyph(code: u8, x: usize, y: usize) -> char {
    if code == EMPTY {
        GLYPHS[14 + (x + y) % 2]
    } else {
        GLYPHS[(code & LOW_NIBBLE) as usize]
    }
}
