//! Consumer side of the pipeline.
//!
//! Each worker pops unexplored nodes, expands them and accumulates children,
//! edges and explored marks into one `FrontierBatch`. A parent is
//! acknowledged on the queue only once the batch holding its children has
//! been applied to the store.

use std::sync::mpsc::Sender;
use std::thread;

use crate::errors::FrontierResult;
use crate::frontier::frontier_store::{Frontier, FrontierBatch};
use crate::frontier::node_record::{EdgeRecord, NodeRecord};
use crate::move_generation::expander::expand;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_events::{emit, PipelineEvent};
use crate::pipeline::shared_run_state::SharedRunState;
use crate::pipeline::work_queue::{Pop, WorkQueue};

pub struct ExpansionWorker<'a> {
    worker_id: usize,
    frontier: &'a dyn Frontier,
    queue: &'a WorkQueue<NodeRecord>,
    config: &'a PipelineConfig,
    state: &'a SharedRunState,
    events: Option<Sender<PipelineEvent>>,
    batch: FrontierBatch,
    expanded: u64,
}

/// Marks the worker inactive however it leaves, and stops the run if it panicked.
struct ActiveWorkerGuard<'a>(&'a SharedRunState);

impl Drop for ActiveWorkerGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.request_stop();
        }
        self.0.worker_exited();
    }
}

impl<'a> ExpansionWorker<'a> {
    /// The caller must have counted this worker with `SharedRunState::worker_started`.
    pub fn new(
        worker_id: usize,
        frontier: &'a dyn Frontier,
        queue: &'a WorkQueue<NodeRecord>,
        config: &'a PipelineConfig,
        state: &'a SharedRunState,
        events: Option<Sender<PipelineEvent>>,
    ) -> Self {
        Self {
            worker_id,
            frontier,
            queue,
            config,
            state,
            events,
            batch: FrontierBatch::default(),
            expanded: 0,
        }
    }

    /// Work until the producer closes the drained queue, the run stops, or a
    /// store write fails.
    /// Returns the number of parents this worker expanded.
    pub fn run(mut self) -> FrontierResult<u64> {
        let _active = ActiveWorkerGuard(self.state);

        let result = self.drain().and_then(|()| self.flush());
        emit(
            self.events.as_ref(),
            PipelineEvent::WorkerExited {
                worker_id: self.worker_id,
                expanded: self.expanded,
            },
        );
        result.map(|()| self.expanded)
    }

    fn drain(&mut self) -> FrontierResult<()> {
        let batch_size = self.config.normalized_batch_size();
        loop {
            if self.state.should_stop() {
                return Ok(());
            }

            let node = match self.queue.try_pop() {
                Some(node) => node,
                None => {
                    // Nothing queued right now: don't sit on finished work.
                    self.flush()?;
                    match self.queue.pop_timeout(self.config.normalized_dequeue_timeout()) {
                        Pop::Item(node) => node,
                        Pop::Closed => return Ok(()),
                        // Only the producer decides the queue is drained, by closing it.
                        Pop::TimedOut => continue,
                    }
                }
            };

            self.expand_into_batch(&node);
            if self.batch.nodes.len() >= batch_size {
                self.flush()?;
            }
        }
    }

    fn expand_into_batch(&mut self, parent: &NodeRecord) {
        for child in expand(&parent.board, parent.move_count) {
            self.batch.edges.push(EdgeRecord::link(parent.id, &child.board));
            self.batch
                .nodes
                .push(NodeRecord::discovered(child.board, child.move_count));
        }
        self.batch.explored.push(parent.id);
        self.expanded += 1;
        self.state.add_expanded(1);
    }

    fn flush(&mut self) -> FrontierResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let summary = match self.frontier.apply_batch(&self.batch, self.config.durability) {
            Ok(summary) => summary,
            Err(error) => {
                self.state.request_stop();
                emit(
                    self.events.as_ref(),
                    PipelineEvent::Aborted {
                        worker_id: Some(self.worker_id),
                        error: error.clone(),
                    },
                );
                return Err(error);
            }
        };

        let parents = self.batch.explored.len();
        let children = self.batch.nodes.len();
        self.state
            .record_flush(children as u64, summary.edges_inserted as u64);
        emit(
            self.events.as_ref(),
            PipelineEvent::Flushed {
                worker_id: self.worker_id,
                parents,
                children,
                edges_inserted: summary.edges_inserted,
            },
        );

        self.batch.clear();
        for _ in 0..parents {
            self.queue.task_done();
        }
        Ok(())
    }
}
