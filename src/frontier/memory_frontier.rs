//! In-process frontier store.
//!
//! A single mutex guards nodes, edges and subscriber channels, so every
//! batch lands atomically and subscribers see a node at most once per
//! transition into the unexplored-under-ceiling set.

use std::collections::HashMap;
use std::sync::{mpsc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::board::board_state::Board;
use crate::errors::FrontierResult;
use crate::frontier::frontier_store::*;
use crate::frontier::node_record::{EdgeId, EdgeRecord, NodeId, NodeRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryFrontierStats {
    pub soft_batches: u64,
    pub hard_batches: u64,
}

#[derive(Debug)]
struct Subscriber {
    max_move_count: u32,
    sender: mpsc::Sender<NodeRecord>,
}

#[derive(Debug, Default)]
struct FrontierTables {
    nodes: HashMap<NodeId, NodeRecord>,
    edges: HashMap<EdgeId, EdgeRecord>,
    subscribers: Vec<Subscriber>,
    stats: MemoryFrontierStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertEffect {
    Inserted,
    Lowered,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct MemoryFrontier {
    tables: Mutex<FrontierTables>,
}

impl MemoryFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, FrontierTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `board` as discovered at `move_count`.
    pub fn seed(&self, board: Board, move_count: u32) -> NodeRecord {
        let (record, _) = self.lock().upsert(NodeRecord::discovered(board, move_count));
        record
    }

    pub fn node(&self, id: &NodeId) -> Option<NodeRecord> {
        self.lock().nodes.get(id).cloned()
    }

    pub fn edges_from(&self, parent: &NodeId) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self
            .lock()
            .edges
            .values()
            .filter(|edge| edge.parent == *parent)
            .copied()
            .collect();
        edges.sort_unstable_by_key(|edge| edge.id);
        edges
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.lock().edges.len()
    }

    pub fn unexplored_count(&self, max_move_count: u32) -> usize {
        self.lock()
            .nodes
            .values()
            .filter(|node| eligible(node, max_move_count))
            .count()
    }

    pub fn stats(&self) -> MemoryFrontierStats {
        self.lock().stats
    }
}

#[inline]
fn eligible(node: &NodeRecord, max_move_count: u32) -> bool {
    !node.explored && node.move_count < max_move_count
}

impl FrontierTables {
    fn upsert(&mut self, node: NodeRecord) -> (NodeRecord, UpsertEffect) {
        let Some(existing) = self.nodes.get_mut(&node.id) else {
            let record = node.clone();
            self.nodes.insert(node.id, node);
            self.publish(&record, None);
            return (record, UpsertEffect::Inserted);
        };

        let before = existing.clone();
        existing.explored |= node.explored;
        let effect = if node.move_count < existing.move_count {
            existing.move_count = node.move_count;
            UpsertEffect::Lowered
        } else {
            UpsertEffect::Unchanged
        };

        let record = existing.clone();
        if effect == UpsertEffect::Lowered {
            self.publish(&record, Some(&before));
        }
        (record, effect)
    }

    fn insert_edges(&mut self, edges: &[EdgeRecord]) -> usize {
        let mut inserted = 0;
        for edge in edges {
            if !self.edges.contains_key(&edge.id) {
                self.edges.insert(edge.id, *edge);
                inserted += 1;
            }
        }
        inserted
    }

    fn mark_explored(&mut self, ids: &[NodeId]) -> usize {
        let mut marked = 0;
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                if !node.explored {
                    node.explored = true;
                    marked += 1;
                }
            }
        }
        marked
    }

    /// Send `record` to every subscriber for which it just became eligible.
    /// Subscribers whose feed was dropped are forgotten.
    fn publish(&mut self, record: &NodeRecord, before: Option<&NodeRecord>) {
        self.subscribers.retain(|sub| {
            let now = eligible(record, sub.max_move_count);
            let was = before.is_some_and(|old| eligible(old, sub.max_move_count));
            if now && !was {
                sub.sender.send(record.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Frontier for MemoryFrontier {
    fn upsert(&self, node: NodeRecord) -> FrontierResult<NodeRecord> {
        Ok(self.lock().upsert(node).0)
    }

    fn insert_edges(&self, edges: &[EdgeRecord]) -> FrontierResult<usize> {
        Ok(self.lock().insert_edges(edges))
    }

    fn mark_explored(&self, ids: &[NodeId]) -> FrontierResult<usize> {
        Ok(self.lock().mark_explored(ids))
    }

    fn apply_batch(
        &self,
        batch: &FrontierBatch,
        durability: Durability,
    ) -> FrontierResult<BatchSummary> {
        let mut tables = self.lock();
        let mut summary = BatchSummary::default();

        for node in &batch.nodes {
            match tables.upsert(node.clone()).1 {
                UpsertEffect::Inserted => summary.nodes_inserted += 1,
                UpsertEffect::Lowered => summary.nodes_lowered += 1,
                UpsertEffect::Unchanged => {}
            }
        }
        summary.edges_inserted = tables.insert_edges(&batch.edges);
        summary.nodes_marked = tables.mark_explored(&batch.explored);

        match durability {
            Durability::Soft => tables.stats.soft_batches += 1,
            Durability::Hard => tables.stats.hard_batches += 1,
        }

        Ok(summary)
    }

    fn has_unexplored(&self, max_move_count: u32) -> FrontierResult<bool> {
        Ok(self
            .lock()
            .nodes
            .values()
            .any(|node| eligible(node, max_move_count)))
    }

    fn subscribe_unexplored(
        &self,
        max_move_count: u32,
    ) -> FrontierResult<Box<dyn UnexploredFeed>> {
        let mut tables = self.lock();
        let (sender, receiver) = mpsc::channel();

        let mut backlog: Vec<&NodeRecord> = tables
            .nodes
            .values()
            .filter(|node| eligible(node, max_move_count))
            .collect();
        backlog.sort_unstable_by_key(|node| (node.move_count, node.id));
        for node in backlog {
            // The receiver is still in scope, so this cannot fail.
            let _ = sender.send(node.clone());
        }

        tables.subscribers.push(Subscriber {
            max_move_count,
            sender,
        });
        Ok(Box::new(MemoryFeed { receiver }))
    }
}

struct MemoryFeed {
    receiver: mpsc::Receiver<NodeRecord>,
}

impl UnexploredFeed for MemoryFeed {
    fn next_timeout(&mut self, timeout: Duration) -> FrontierResult<FeedPoll> {
        match self.receiver.recv_timeout(timeout) {
            Ok(node) => Ok(FeedPoll::Node(node)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(FeedPoll::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(FeedPoll::Closed),
        }
    }
}
