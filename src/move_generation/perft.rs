//! Leaf counting over the expander, for correctness checks and benches.

use std::thread;

use crate::board::board_state::Board;
use crate::board::piece_codes::{is_active_piece, is_inactive_piece, PAWN, TYPE_MASK};
use crate::move_generation::expander::{expand, Successor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub promotions: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.promotions += rhs.promotions;
    }
}

pub fn perft(board: &Board, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for child in expand(board, 0) {
        perft_recurse(board, &child, depth, 1, &mut total);
    }
    total
}

/// Same counts as `perft`, with one thread per root successor.
pub fn perft_multi_threaded(board: &Board, depth: u8) -> PerftCounts {
    if depth == 0 {
        return perft(board, depth);
    }

    let root = *board;
    let children: Vec<Successor> = expand(&root, 0).collect();

    thread::scope(|scope| {
        let handles: Vec<_> = children
            .iter()
            .map(|child| {
                scope.spawn(move || {
                    let mut local = PerftCounts::default();
                    perft_recurse(&root, child, depth, 1, &mut local);
                    local
                })
            })
            .collect();

        let mut total = PerftCounts::default();
        for handle in handles {
            match handle.join() {
                Ok(local) => total.merge(local),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        total
    })
}

fn perft_recurse(
    parent: &Board,
    child: &Successor,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) {
    if current_depth == search_depth {
        counts.nodes += 1;
        let parent_pieces = parent.piece_count();
        if child.board.piece_count() < parent_pieces {
            counts.captures += 1;
        }
        if promoted(parent, &child.board) {
            counts.promotions += 1;
        }
        return;
    }

    for grandchild in expand(&child.board, child.move_count) {
        perft_recurse(&child.board, &grandchild, search_depth, current_depth + 1, counts);
    }
}

/// The mover had fewer non-pawn pieces before the move than after it.
fn promoted(parent: &Board, child: &Board) -> bool {
    let officers = |board: &Board, owned: fn(u8) -> bool| {
        board
            .cells()
            .iter()
            .flatten()
            .filter(|&&code| owned(code) && code & TYPE_MASK != PAWN)
            .count()
    };
    officers(child, is_inactive_piece) > officers(parent, is_active_piece)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_multi_threaded, PerftCounts};
    use crate::board::board_state::Board;
    use crate::board::piece_codes::*;

    #[test]
    fn perft_from_initial_position() {
        let board = Board::initial();
        assert_eq!(perft(&board, 0).nodes, 1);
        assert_eq!(perft(&board, 1).nodes, 20);
        let depth_two = perft(&board, 2);
        assert_eq!(depth_two.nodes, 400);
        assert_eq!(depth_two.captures, 0);
    }

    #[test]
    fn threaded_perft_matches_single_thread() {
        let board = Board::initial();
        assert_eq!(perft_multi_threaded(&board, 2), perft(&board, 2));
    }

    #[test]
    fn promotions_are_counted() {
        let mut board = Board::empty();
        board.set(0, 7, KING | ACTIVE);
        board.set(7, 3, KING);
        board.set(2, 1, PAWN | ACTIVE);
        let counts = perft(&board, 1);
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 3 + 4,
                captures: 0,
                promotions: 4,
            }
        );
    }
}
