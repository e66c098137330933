//! Per-piece destination generation.
//!
//! Moves are produced as lazy `(dx, dy)` deltas. `raw_deltas` applies board
//! bounds and the pawn's own occupancy conditions; `legal_deltas` adds the
//! per-class ending and path rules on top. Neither looks at check, which is
//! the job of `check_oracle`.

use crate::board::board_state::{offset_position, Board, Placement, PAWN_START_ROW};
use crate::board::piece_codes::*;
use crate::move_generation::move_deltas::*;

/// Delta table for a piece code. Empty cells and unknown type bits map to an
/// empty table.
#[inline]
pub fn delta_table(code: u8) -> &'static [Delta] {
    match PieceKind::from_code(code) {
        Some(PieceKind::Bishop) => &BISHOP_DELTAS,
        Some(PieceKind::King) => &KING_DELTAS,
        Some(PieceKind::Knight) => &KNIGHT_DELTAS,
        Some(PieceKind::Pawn) => &PAWN_DELTAS,
        Some(PieceKind::Queen) => &QUEEN_DELTAS,
        Some(PieceKind::Rook) => &ROOK_DELTAS,
        None => &[],
    }
}

/// Deltas that stay on the board. Pawn candidates are additionally gated on
/// their occupancy conditions, since those define which pawn moves exist.
pub fn raw_deltas(board: &Board, piece: Placement) -> impl Iterator<Item = Delta> + '_ {
    let is_pawn = PieceKind::from_code(piece.code) == Some(PieceKind::Pawn);
    delta_table(piece.code)
        .iter()
        .copied()
        .filter(move |&(dx, dy)| offset_position(piece.x, piece.y, dx, dy).is_some())
        .filter(move |&delta| !is_pawn || pawn_delta_allowed(board, piece, delta))
}

/// Deltas that obey the ending and path rules of the piece's class.
pub fn legal_deltas(board: &Board, piece: Placement) -> impl Iterator<Item = Delta> + '_ {
    let kind = PieceKind::from_code(piece.code);
    raw_deltas(board, piece).filter(move |&delta| match kind {
        Some(kind) if kind.is_sliding() => {
            ending_allowed(board, piece, delta) && path_clear(board, piece, delta)
        }
        Some(PieceKind::King | PieceKind::Knight) => ending_allowed(board, piece, delta),
        Some(PieceKind::Pawn) => true,
        _ => false,
    })
}

/// The destination is not held by a piece of the side to move.
#[inline]
fn ending_allowed(board: &Board, piece: Placement, (dx, dy): Delta) -> bool {
    board
        .offset(piece.x, piece.y, dx, dy)
        .is_some_and(|code| !is_active_piece(code))
}

/// Every cell strictly between source and destination is empty.
fn path_clear(board: &Board, piece: Placement, delta: Delta) -> bool {
    let (ux, uy) = unit(delta);
    (1..distance(delta)).all(|step| {
        board
            .offset(piece.x, piece.y, ux * step, uy * step)
            .is_some_and(|code| code == EMPTY)
    })
}

fn pawn_delta_allowed(board: &Board, piece: Placement, delta: Delta) -> bool {
    let target = board.offset(piece.x, piece.y, delta.0, delta.1);
    match delta {
        (0, -1) => target == Some(EMPTY),
        (0, -2) => {
            piece.y == PAWN_START_ROW
                && board.offset(piece.x, piece.y, 0, -1) == Some(EMPTY)
                && target == Some(EMPTY)
        }
        (-1, -1) | (1, -1) => target.is_some_and(is_inactive_piece),
        _ => false,
    }
}
