//! One end-to-end expansion run: work check, then producer plus worker pool.

use std::sync::{mpsc::Sender, Arc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::PipelineError;
use crate::frontier::frontier_store::Frontier;
use crate::frontier::node_record::NodeRecord;
use crate::pipeline::coordinator::{Coordinator, ProducerReport};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_events::{emit, PipelineEvent, ProducerExit};
use crate::pipeline::shared_run_state::{RunCounters, SharedRunState};
use crate::pipeline::work_queue::WorkQueue;
use crate::pipeline::worker_pool::ExpansionWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The producer saw the feed drained and every forwarded node was
    /// acknowledged by a worker.
    Completed,
    /// A stop was requested before the queue drained.
    Stopped,
    /// The run ended without a stop but before the frontier was exhausted,
    /// e.g. the feed closed or every worker left early.
    Incomplete,
    /// Nothing unexplored under the ceiling when the run started.
    NoWork,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counters: RunCounters,
    /// Nodes the producer handed to workers.
    pub forwarded: u64,
}

impl RunReport {
    #[inline]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Expand every unexplored node under `config.max_move_count`, including
/// the ones discovered along the way, until the frontier is exhausted.
///
/// `state` is not reset here; a stop requested on it before or during the
/// run ends the run early with `RunOutcome::Stopped`. Only a producer that
/// saw the feed drained, with every forwarded node acknowledged, yields
/// `RunOutcome::Completed`.
pub fn run_expansion(
    frontier: Arc<dyn Frontier>,
    config: PipelineConfig,
    state: Arc<SharedRunState>,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunReport, PipelineError> {
    let started_at = Utc::now();
    let frontier: &dyn Frontier = frontier.as_ref();
    let state: &SharedRunState = state.as_ref();
    let queue: WorkQueue<NodeRecord> = WorkQueue::new(config.normalized_capacity());
    let workers = config.normalized_workers();

    let coordinator = Coordinator::new(frontier, &queue, &config, state, events.clone());
    if !coordinator.has_work()? {
        emit(
            events.as_ref(),
            PipelineEvent::NoWork {
                max_move_count: config.max_move_count,
            },
        );
        return Ok(RunReport {
            outcome: RunOutcome::NoWork,
            started_at,
            finished_at: Utc::now(),
            counters: state.counters(),
            forwarded: 0,
        });
    }
    emit(
        events.as_ref(),
        PipelineEvent::Seeded {
            max_move_count: config.max_move_count,
            workers,
        },
    );

    // Count every worker before anything starts so the producer never
    // mistakes a pool that hasn't spun up yet for one that has exited.
    for _ in 0..workers {
        state.worker_started();
    }

    let (producer_result, worker_results) = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let worker = ExpansionWorker::new(
                    worker_id,
                    frontier,
                    &queue,
                    &config,
                    state,
                    events.clone(),
                );
                scope.spawn(move || worker.run())
            })
            .collect();
        let producer = scope.spawn(move || coordinator.run());

        let producer_result = producer.join();
        let worker_results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        (producer_result, worker_results)
    });

    let mut first_error: Option<PipelineError> = None;
    let producer = match producer_result {
        Ok(Ok(report)) => Some(report),
        Ok(Err(error)) => {
            first_error.get_or_insert(error.into());
            None
        }
        Err(_) => {
            first_error.get_or_insert(PipelineError::ProducerPanicked);
            None
        }
    };
    for (worker_id, result) in worker_results.into_iter().enumerate() {
        match result {
            Ok(Ok(_)) => {}
            Ok(Err(error)) => {
                first_error.get_or_insert(error.into());
            }
            Err(_) => {
                first_error.get_or_insert(PipelineError::WorkerPanicked { worker_id });
            }
        }
    }
    if let Some(error) = first_error {
        return Err(error);
    }

    // Every thread has been joined, so nothing can acknowledge work any more.
    let backlog_cleared = queue.join_timeout(Duration::ZERO);
    let outcome = match producer {
        _ if state.should_stop() => RunOutcome::Stopped,
        Some(ProducerReport {
            exit: ProducerExit::Drained,
            ..
        }) if backlog_cleared => RunOutcome::Completed,
        _ => RunOutcome::Incomplete,
    };
    Ok(RunReport {
        outcome,
        started_at,
        finished_at: Utc::now(),
        counters: state.counters(),
        forwarded: producer.map_or(0, |report| report.forwarded),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    use super::{run_expansion, RunOutcome};
    use crate::board::board_state::Board;
    use crate::errors::{FrontierError, FrontierResult, PipelineError};
    use crate::frontier::frontier_store::*;
    use crate::frontier::memory_frontier::MemoryFrontier;
    use crate::frontier::node_record::{EdgeRecord, NodeId, NodeRecord};
    use crate::move_generation::perft::perft;
    use crate::pipeline::pipeline_config::PipelineConfig;
    use crate::pipeline::pipeline_events::PipelineEvent;
    use crate::pipeline::shared_run_state::SharedRunState;

    fn quick_config(max_move_count: u32) -> PipelineConfig {
        PipelineConfig {
            workers: 3,
            dequeue_timeout: Duration::from_millis(500),
            feed_poll_interval: Duration::from_millis(10),
            batch_size: 50,
            max_move_count,
            ..PipelineConfig::default()
        }
    }

    /// Store whose writes always fail.
    struct ReadOnlyFrontier(MemoryFrontier);

    impl Frontier for ReadOnlyFrontier {
        fn upsert(&self, node: NodeRecord) -> FrontierResult<NodeRecord> {
            self.0.upsert(node)
        }

        fn insert_edges(&self, _edges: &[EdgeRecord]) -> FrontierResult<usize> {
            Err(FrontierError::WriteFailed("read only".to_owned()))
        }

        fn mark_explored(&self, _ids: &[NodeId]) -> FrontierResult<usize> {
            Err(FrontierError::WriteFailed("read only".to_owned()))
        }

        fn apply_batch(
            &self,
            _batch: &FrontierBatch,
            _durability: Durability,
        ) -> FrontierResult<BatchSummary> {
            Err(FrontierError::WriteFailed("read only".to_owned()))
        }

        fn has_unexplored(&self, max_move_count: u32) -> FrontierResult<bool> {
            self.0.has_unexplored(max_move_count)
        }

        fn subscribe_unexplored(
            &self,
            max_move_count: u32,
        ) -> FrontierResult<Box<dyn UnexploredFeed>> {
            self.0.subscribe_unexplored(max_move_count)
        }
    }

    /// Feed that is already gone when subscribed.
    struct ClosedFeed;

    impl UnexploredFeed for ClosedFeed {
        fn next_timeout(&mut self, _timeout: Duration) -> FrontierResult<FeedPoll> {
            Ok(FeedPoll::Closed)
        }
    }

    /// Store whose unexplored feed closes immediately.
    struct DeafFrontier(MemoryFrontier);

    impl Frontier for DeafFrontier {
        fn upsert(&self, node: NodeRecord) -> FrontierResult<NodeRecord> {
            self.0.upsert(node)
        }

        fn insert_edges(&self, edges: &[EdgeRecord]) -> FrontierResult<usize> {
            self.0.insert_edges(edges)
        }

        fn mark_explored(&self, ids: &[NodeId]) -> FrontierResult<usize> {
            self.0.mark_explored(ids)
        }

        fn apply_batch(
            &self,
            batch: &FrontierBatch,
            durability: Durability,
        ) -> FrontierResult<BatchSummary> {
            self.0.apply_batch(batch, durability)
        }

        fn has_unexplored(&self, max_move_count: u32) -> FrontierResult<bool> {
            self.0.has_unexplored(max_move_count)
        }

        fn subscribe_unexplored(
            &self,
            _max_move_count: u32,
        ) -> FrontierResult<Box<dyn UnexploredFeed>> {
            Ok(Box::new(ClosedFeed))
        }
    }

    /// Store that requests a stop on the run as its first write lands.
    struct StoppingFrontier {
        inner: MemoryFrontier,
        state: Arc<SharedRunState>,
    }

    impl Frontier for StoppingFrontier {
        fn upsert(&self, node: NodeRecord) -> FrontierResult<NodeRecord> {
            self.inner.upsert(node)
        }

        fn insert_edges(&self, edges: &[EdgeRecord]) -> FrontierResult<usize> {
            self.inner.insert_edges(edges)
        }

        fn mark_explored(&self, ids: &[NodeId]) -> FrontierResult<usize> {
            self.inner.mark_explored(ids)
        }

        fn apply_batch(
            &self,
            batch: &FrontierBatch,
            durability: Durability,
        ) -> FrontierResult<BatchSummary> {
            self.state.request_stop();
            self.inner.apply_batch(batch, durability)
        }

        fn has_unexplored(&self, max_move_count: u32) -> FrontierResult<bool> {
            self.inner.has_unexplored(max_move_count)
        }

        fn subscribe_unexplored(
            &self,
            max_move_count: u32,
        ) -> FrontierResult<Box<dyn UnexploredFeed>> {
            self.inner.subscribe_unexplored(max_move_count)
        }
    }

    #[test]
    fn single_seed_is_expanded_and_marked() {
        let store = Arc::new(MemoryFrontier::new());
        let root = store.seed(Board::initial(), 0);

        let report = run_expansion(store.clone(), quick_config(1), SharedRunState::new(), None)
            .expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.counters.nodes_expanded, 1);
        assert_eq!(report.counters.children_written, 20);
        assert_eq!(report.forwarded, 1);
        assert!(report.finished_at >= report.started_at);
        // One wake-up of an idle worker plus the producer's final idle poll.
        let config = quick_config(1);
        let bound = chrono::Duration::from_std(config.dequeue_timeout + config.feed_poll_interval)
            .expect("bound fits");
        assert!(report.elapsed() <= bound);

        assert!(store.node(&root.id).is_some_and(|node| node.explored));
        assert_eq!(store.node_count(), 21);
        assert_eq!(store.edge_count(), 20);
        assert_eq!(store.unexplored_count(1), 0);
    }

    #[test]
    fn newly_discovered_nodes_are_expanded_under_the_ceiling() {
        let store = Arc::new(MemoryFrontier::new());
        store.seed(Board::initial(), 0);

        let report = run_expansion(store.clone(), quick_config(2), SharedRunState::new(), None)
            .expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.counters.nodes_expanded, 21);
        assert_eq!(store.unexplored_count(2), 0);
        assert_eq!(store.edge_count(), 20 + 400);
        // Leaves at ply 2 are distinct positions reached once each here.
        assert_eq!(store.node_count(), 1 + 20 + perft(&Board::initial(), 2).nodes);
    }

    #[test]
    fn empty_frontier_reports_no_work() {
        let store = Arc::new(MemoryFrontier::new());
        store.seed(Board::initial(), 1);
        let (tx, rx) = mpsc::channel();

        let report = run_expansion(store, quick_config(1), SharedRunState::new(), Some(tx))
            .expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::NoWork);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![PipelineEvent::NoWork { max_move_count: 1 }]
        );
    }

    #[test]
    fn write_failure_aborts_the_run() {
        let inner = MemoryFrontier::new();
        let root = inner.seed(Board::initial(), 0);
        let store = Arc::new(ReadOnlyFrontier(inner));

        let result = run_expansion(store.clone(), quick_config(1), SharedRunState::new(), None);

        assert_eq!(
            result,
            Err(PipelineError::Frontier(FrontierError::WriteFailed(
                "read only".to_owned()
            )))
        );
        assert!(store.0.node(&root.id).is_some_and(|node| !node.explored));
    }

    #[test]
    fn requested_stop_leaves_work_unexplored() {
        let store = Arc::new(MemoryFrontier::new());
        let root = store.seed(Board::initial(), 0);
        let state = SharedRunState::new();
        state.request_stop();

        let report = run_expansion(store.clone(), quick_config(1), state, None)
            .expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert_eq!(report.counters.nodes_expanded, 0);
        assert!(store.node(&root.id).is_some_and(|node| !node.explored));
    }

    #[test]
    fn zero_dequeue_timeout_still_expands_the_seed() {
        for _ in 0..5 {
            let store = Arc::new(MemoryFrontier::new());
            let root = store.seed(Board::initial(), 0);
            let config = PipelineConfig {
                workers: 2,
                dequeue_timeout: Duration::ZERO,
                feed_poll_interval: Duration::from_millis(50),
                ..quick_config(1)
            };

            let report = run_expansion(store.clone(), config, SharedRunState::new(), None)
                .expect("run succeeds");

            assert_eq!(report.outcome, RunOutcome::Completed);
            assert_eq!(report.counters.nodes_expanded, 1);
            assert!(store.node(&root.id).is_some_and(|node| node.explored));
        }
    }

    #[test]
    fn closed_feed_reports_incomplete() {
        let inner = MemoryFrontier::new();
        let root = inner.seed(Board::initial(), 0);
        let store = Arc::new(DeafFrontier(inner));

        let report = run_expansion(store.clone(), quick_config(1), SharedRunState::new(), None)
            .expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::Incomplete);
        assert_eq!(report.forwarded, 0);
        assert!(store.0.node(&root.id).is_some_and(|node| !node.explored));
    }

    #[test]
    fn stop_during_the_run_keeps_flushed_work() {
        let state = SharedRunState::new();
        let inner = MemoryFrontier::new();
        let root = inner.seed(Board::initial(), 0);
        let store = Arc::new(StoppingFrontier {
            inner,
            state: state.clone(),
        });
        let config = PipelineConfig {
            batch_size: 1,
            ..quick_config(2)
        };

        let report = run_expansion(store.clone(), config, state, None).expect("run succeeds");

        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert!(store.inner.node(&root.id).is_some_and(|node| node.explored));
        assert_eq!(store.inner.edges_from(&root.id).len(), 20);
        assert!(store.inner.unexplored_count(2) >= 19);
    }
}
