//! Producer side of the pipeline.
//!
//! The coordinator is the only writer to the work queue. It forwards the
//! store's unexplored feed into the queue and decides when the run is over.

use std::sync::mpsc::Sender;
use std::thread;

use crate::errors::FrontierResult;
use crate::frontier::frontier_store::{FeedPoll, Frontier, UnexploredFeed};
use crate::frontier::node_record::NodeRecord;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_events::{emit, PipelineEvent, ProducerExit};
use crate::pipeline::shared_run_state::SharedRunState;
use crate::pipeline::work_queue::{Push, WorkQueue};

/// How the producer's part of a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerReport {
    pub forwarded: u64,
    pub exit: ProducerExit,
}

pub struct Coordinator<'a> {
    frontier: &'a dyn Frontier,
    queue: &'a WorkQueue<NodeRecord>,
    config: &'a PipelineConfig,
    state: &'a SharedRunState,
    events: Option<Sender<PipelineEvent>>,
    forwarded: u64,
}

/// Closes the queue however the producer leaves, so workers never wait on a
/// producer that is gone.
struct CloseOnDrop<'a> {
    queue: &'a WorkQueue<NodeRecord>,
    state: &'a SharedRunState,
}

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.state.request_stop();
        }
        self.queue.close();
    }
}

impl<'a> Coordinator<'a> {
    pub fn new(
        frontier: &'a dyn Frontier,
        queue: &'a WorkQueue<NodeRecord>,
        config: &'a PipelineConfig,
        state: &'a SharedRunState,
        events: Option<Sender<PipelineEvent>>,
    ) -> Self {
        Self {
            frontier,
            queue,
            config,
            state,
            events,
            forwarded: 0,
        }
    }

    /// Whether the store holds any work under the ceiling.
    pub fn has_work(&self) -> FrontierResult<bool> {
        self.frontier.has_unexplored(self.config.max_move_count)
    }

    /// Forward the unexplored feed into the queue until the run is over,
    /// then close the queue.
    pub fn run(mut self) -> FrontierResult<ProducerReport> {
        let _close = CloseOnDrop {
            queue: self.queue,
            state: self.state,
        };

        match self.forward() {
            Ok(exit) => {
                emit(
                    self.events.as_ref(),
                    PipelineEvent::ProducerFinished {
                        forwarded: self.forwarded,
                        reason: exit,
                    },
                );
                Ok(ProducerReport {
                    forwarded: self.forwarded,
                    exit,
                })
            }
            Err(error) => {
                self.state.request_stop();
                emit(
                    self.events.as_ref(),
                    PipelineEvent::Aborted {
                        worker_id: None,
                        error: error.clone(),
                    },
                );
                Err(error)
            }
        }
    }

    fn forward(&mut self) -> FrontierResult<ProducerExit> {
        let ceiling = self.config.max_move_count;
        let mut feed: Box<dyn UnexploredFeed> = self.frontier.subscribe_unexplored(ceiling)?;

        loop {
            if let Some(reason) = self.should_finish() {
                return Ok(reason);
            }

            // Sampled before polling: a worker publishes children before it
            // acknowledges the parent, so if nothing was in flight here, a
            // timed-out poll means the feed has nothing more to give.
            let idle = self.queue.unfinished() == 0;

            match feed.next_timeout(self.config.normalized_feed_poll_interval())? {
                FeedPoll::Node(node) => {
                    if node.explored || node.move_count >= ceiling {
                        continue;
                    }
                    if let Some(reason) = self.enqueue(node) {
                        return Ok(reason);
                    }
                    self.forwarded += 1;
                }
                FeedPoll::TimedOut if idle => return Ok(ProducerExit::Drained),
                FeedPoll::TimedOut => {}
                FeedPoll::Closed => return Ok(ProducerExit::FeedClosed),
            }
        }
    }

    /// Push with bounded waits so a full queue cannot hide a stop request.
    fn enqueue(&self, node: NodeRecord) -> Option<ProducerExit> {
        let wait = self.config.normalized_feed_poll_interval();
        let mut pending = node;
        loop {
            match self.queue.push_timeout(pending, wait) {
                Push::Queued => return None,
                Push::Full(node) => pending = node,
                Push::Closed(_) => return Some(ProducerExit::Stopped),
            }
            if let Some(reason) = self.should_finish() {
                return Some(reason);
            }
        }
    }

    fn should_finish(&self) -> Option<ProducerExit> {
        if self.state.should_stop() {
            Some(ProducerExit::Stopped)
        } else if self.state.active_workers() == 0 {
            Some(ProducerExit::WorkersGone)
        } else {
            None
        }
    }
}
