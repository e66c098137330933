//! Single-ply king threat detection.
//!
//! A board "threatens" when some piece of the side to move has a legal
//! delta landing on the opposing king. The expander asks this twice: once on
//! the parent, to decide whether the mover is already attacking the king,
//! and once on every normalized successor, where the opponent has become the
//! mover and a threat means the previous mover left its king en prise.

use crate::board::board_state::{offset_position, Board, Placement};
use crate::board::piece_codes::is_inactive_king;
use crate::move_generation::move_generator::legal_deltas;

/// The side to move can capture the opposing king on this ply.
pub fn threatens_opposing_king(board: &Board) -> bool {
    let Some(king) = board.find(is_inactive_king) else {
        return false;
    };
    board
        .active_pieces()
        .any(|piece| piece_hits(board, piece, king))
}

fn piece_hits(board: &Board, piece: Placement, king: (usize, usize)) -> bool {
    legal_deltas(board, piece)
        .any(|(dx, dy)| offset_position(piece.x, piece.y, dx, dy) == Some(king))
}

#[cfg(test)]
mod tests {
    use super::threatens_opposing_king;
    use crate::board::board_state::Board;
    use crate::board::piece_codes::*;

    #[test]
    fn initial_board_has_no_threat() {
        assert!(!threatens_opposing_king(&Board::initial()));
        assert!(!threatens_opposing_king(&Board::initial().swap_perspective()));
    }

    #[test]
    fn adjacent_queen_threatens() {
        let mut board = Board::empty();
        board.set(4, 7, KING | ACTIVE);
        board.set(4, 1, QUEEN | ACTIVE);
        board.set(4, 0, KING);
        assert!(threatens_opposing_king(&board));
        assert!(!threatens_opposing_king(&board.swap_perspective()));
    }

    #[test]
    fn blocked_rook_does_not_threaten() {
        let mut board = Board::empty();
        board.set(0, 7, ROOK | ACTIVE);
        board.set(0, 4, PAWN);
        board.set(0, 0, KING | AUX_FLAG);
        board.set(7, 7, KING | ACTIVE);
        assert!(!threatens_opposing_king(&board));

        board.set(0, 4, EMPTY);
        assert!(threatens_opposing_king(&board));
    }

    #[test]
    fn pawn_threatens_diagonally_only() {
        let mut board = Board::empty();
        board.set(3, 3, PAWN | ACTIVE);
        board.set(3, 2, KING);
        assert!(!threatens_opposing_king(&board));

        board.set(3, 2, EMPTY);
        board.set(4, 2, KING);
        assert!(threatens_opposing_king(&board));
    }

    #[test]
    fn missing_opposing_king_is_never_threatened() {
        let mut board = Board::empty();
        board.set(4, 4, QUEEN | ACTIVE);
        assert!(!threatens_opposing_king(&board));
    }
}
