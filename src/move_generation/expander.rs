//! One-ply successor expansion.
//!
//! Combines per-piece move generation with the king-threat oracle to produce
//! every legal child of a board, already normalized to the perspective of the
//! side that moves next.
//!
//! Check handling is narrow:
//! - if the mover can already capture the opposing king, only king captures
//!   are produced and no further filtering is applied;
//! - otherwise any child in which the new mover can capture the old mover's
//!   king is discarded.
//!
//! A board missing either king is decided and has no successors.

use crate::board::board_state::{offset_position, Board, Placement, TERMINAL_ROW};
use crate::board::piece_codes::*;
use crate::move_generation::check_oracle::threatens_opposing_king;
use crate::move_generation::move_deltas::Delta;
use crate::move_generation::move_generator::legal_deltas;

/// A normalized child board and the number of plies played to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Successor {
    pub board: Board,
    pub move_count: u32,
}

/// Lazily expand `board`. The sequence is single-use; call again to
/// re-enumerate.
pub fn expand(board: &Board, move_count: u32) -> impl Iterator<Item = Successor> + '_ {
    let live = board.has_both_kings();
    let king_exposed = live && threatens_opposing_king(board);

    board
        .active_pieces()
        .filter(move |_| live)
        .flat_map(move |piece| piece_successors(board, piece, king_exposed))
        .map(move |child| Successor {
            board: child,
            move_count: move_count.saturating_add(1),
        })
}

/// Normalized children reachable by moving `piece`.
fn piece_successors(
    board: &Board,
    piece: Placement,
    king_exposed: bool,
) -> impl Iterator<Item = Board> + '_ {
    legal_deltas(board, piece)
        .filter(move |&delta| !king_exposed || lands_on_king(board, piece, delta))
        .flat_map(move |delta| place(board, piece, delta))
        .flatten()
        .filter(move |child| king_exposed || !threatens_opposing_king(child))
}

fn lands_on_king(board: &Board, piece: Placement, (dx, dy): Delta) -> bool {
    board
        .offset(piece.x, piece.y, dx, dy)
        .is_some_and(is_king)
}

/// Apply one move and normalize. A pawn reaching the terminal row yields
/// one board per promotion choice; every other move yields a single board.
fn place(board: &Board, piece: Placement, (dx, dy): Delta) -> [Option<Board>; 4] {
    let mut out = [None; 4];
    let Some((tx, ty)) = offset_position(piece.x, piece.y, dx, dy) else {
        return out;
    };

    let mut next = *board;
    next.set(piece.x, piece.y, EMPTY);

    let moving = piece.code & LOW_NIBBLE;
    if moving == PAWN | ACTIVE && ty == TERMINAL_ROW {
        for (slot, promote) in out.iter_mut().zip(PROMOTION_CHOICES) {
            next.set(tx, ty, promote | ACTIVE);
            *slot = Some(next.swap_perspective());
        }
    } else {
        next.set(tx, ty, moving);
        out[0] = Some(next.swap_perspective());
    }

    out
}
