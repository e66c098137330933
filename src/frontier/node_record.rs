//! Persisted frontier records.
//!
//! Nodes are content addressed by their raw grid bytes; edges by a hash of
//! the parent id and the child bytes. Neither needs coordinated id issuance.

use std::fmt;

use crate::board::board_state::{Board, CELL_COUNT};
use crate::board::render_board::render_board;
use crate::frontier::edge_hash::edge_id;

/// Node identity: the 64 grid bytes of the board, row-major.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId([u8; CELL_COUNT]);

impl NodeId {
    #[inline]
    pub fn of(board: &Board) -> Self {
        Self(board.to_bytes())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; CELL_COUNT] {
        &self.0
    }

    #[inline]
    pub fn board(&self) -> Board {
        Board::from_bytes(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Edge identity, see `edge_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u128);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub board: Board,
    /// Fewest plies from the game start proven for this board.
    pub move_count: u32,
    /// Emoji rendering for people browsing the store.
    pub display: String,
    pub explored: bool,
}

impl NodeRecord {
    /// Fresh unexplored record for a newly discovered board.
    pub fn discovered(board: Board, move_count: u32) -> Self {
        Self {
            id: NodeId::of(&board),
            board,
            move_count,
            display: render_board(&board),
            explored: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub parent: NodeId,
    pub child: NodeId,
}

impl EdgeRecord {
    pub fn link(parent: NodeId, child: &Board) -> Self {
        Self {
            id: edge_id(&parent, child),
            parent,
            child: NodeId::of(child),
        }
    }
}
