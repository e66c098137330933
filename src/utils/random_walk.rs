//! Random play-outs over the expander.
//!
//! Used to seed a frontier with positions deeper in the tree and to drive
//! property tests over non-trivial boards.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::board::board_state::Board;
use crate::move_generation::expander::{expand, Successor};

/// Play up to `plies` uniformly random legal moves from `start`.
///
/// Returns every position visited after the start, in order. The line ends
/// early when a position has no successors.
pub fn random_walk<R: Rng + ?Sized>(
    start: Board,
    move_count: u32,
    plies: usize,
    rng: &mut R,
) -> Vec<Successor> {
    let mut line = Vec::with_capacity(plies);
    let mut current = Successor {
        board: start,
        move_count,
    };

    for _ in 0..plies {
        let children: Vec<Successor> = expand(&current.board, current.move_count).collect();
        let Some(&next) = children.choose(rng) else {
            break;
        };
        line.push(next);
        current = next;
    }

    line
}
