//! Validation of moves proposed by an interactive player.
//!
//! A player submits the board as it sees it right after moving, before the
//! hand-over to the opponent. The proposal is accepted only when its
//! normalized form is one of the expander's children.

use crate::board::board_state::Board;
use crate::errors::TransitionError;
use crate::move_generation::expander::expand;

/// Check `proposed` against the legal successors of `parent` and return the
/// normalized child on success.
pub fn validate_transition(parent: &Board, proposed: &Board) -> Result<Board, TransitionError> {
    if !parent.has_both_kings() {
        return Err(TransitionError::GameOver);
    }

    let normalized = proposed.swap_perspective();
    expand(parent, 0)
        .map(|child| child.board)
        .find(|child| *child == normalized)
        .ok_or(TransitionError::IllegalTransition { parent: *parent })
}
