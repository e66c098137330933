//! Storage contract for the frontier graph.
//!
//! The pipeline only talks to a store through this trait, so the backing
//! engine can be swapped. Implementations must uphold:
//! - upserts keep the lowest move count ever written for a node;
//! - the explored flag never goes back to false;
//! - edges are append-only and keyed by `EdgeId`;
//! - `apply_batch` is atomic as observed by any reader or subscriber.

use std::time::Duration;

use crate::errors::FrontierResult;
use crate::frontier::node_record::{EdgeRecord, NodeId, NodeRecord};

/// Write durability requested for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// Acknowledge once the write is applied in memory. Nodes can always be
    /// re-derived, so this is the pipeline default.
    #[default]
    Soft,
    /// Acknowledge only after the write is persisted.
    Hard,
}

/// Everything one worker flush writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierBatch {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub explored: Vec<NodeId>,
}

impl FrontierBatch {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.explored.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.explored.clear();
    }
}

/// What a batch changed in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub nodes_inserted: usize,
    pub nodes_lowered: usize,
    pub edges_inserted: usize,
    pub nodes_marked: usize,
}

/// One poll of an unexplored-node feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPoll {
    Node(NodeRecord),
    TimedOut,
    /// The store side of the feed is gone; nothing more will arrive.
    Closed,
}

/// Live stream of unexplored nodes under a move-count ceiling.
pub trait UnexploredFeed: Send {
    fn next_timeout(&mut self, timeout: Duration) -> FrontierResult<FeedPoll>;
}

pub trait Frontier: Send + Sync {
    /// Insert or merge one node, returning the stored record.
    fn upsert(&self, node: NodeRecord) -> FrontierResult<NodeRecord>;

    fn insert_edges(&self, edges: &[EdgeRecord]) -> FrontierResult<usize>;

    fn mark_explored(&self, ids: &[NodeId]) -> FrontierResult<usize>;

    /// Apply node upserts, edge inserts and explored marks as one unit.
    fn apply_batch(&self, batch: &FrontierBatch, durability: Durability)
        -> FrontierResult<BatchSummary>;

    /// Whether any unexplored node has `move_count < max_move_count`.
    fn has_unexplored(&self, max_move_count: u32) -> FrontierResult<bool>;

    /// Emit every unexplored node under the ceiling, then keep emitting nodes
    /// as they become unexplored and under the ceiling.
    fn subscribe_unexplored(&self, max_move_count: u32)
        -> FrontierResult<Box<dyn UnexploredFeed>>;
}
