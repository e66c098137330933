//! Progress events emitted while a run is in flight.
//!
//! Each event renders as one `info string` line.

use std::fmt;
use std::sync::mpsc::Sender;

use crate::errors::FrontierError;

/// Why the producer stopped forwarding nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerExit {
    /// The feed went quiet with nothing left in the queue.
    Drained,
    WorkersGone,
    FeedClosed,
    Stopped,
}

impl fmt::Display for ProducerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProducerExit::Drained => "drained",
            ProducerExit::WorkersGone => "workers_gone",
            ProducerExit::FeedClosed => "feed_closed",
            ProducerExit::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Seeded {
        max_move_count: u32,
        workers: usize,
    },
    NoWork {
        max_move_count: u32,
    },
    Flushed {
        worker_id: usize,
        parents: usize,
        children: usize,
        edges_inserted: usize,
    },
    WorkerExited {
        worker_id: usize,
        expanded: u64,
    },
    ProducerFinished {
        forwarded: u64,
        reason: ProducerExit,
    },
    Aborted {
        worker_id: Option<usize>,
        error: FrontierError,
    },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Seeded {
                max_move_count,
                workers,
            } => write!(
                f,
                "info string frontier seeded max_move_count {max_move_count} workers {workers}"
            ),
            PipelineEvent::NoWork { max_move_count } => write!(
                f,
                "info string frontier no_work max_move_count {max_move_count}"
            ),
            PipelineEvent::Flushed {
                worker_id,
                parents,
                children,
                edges_inserted,
            } => write!(
                f,
                "info string worker {worker_id} flushed parents {parents} children {children} edges {edges_inserted}"
            ),
            PipelineEvent::WorkerExited {
                worker_id,
                expanded,
            } => write!(f, "info string worker {worker_id} exited expanded {expanded}"),
            PipelineEvent::ProducerFinished { forwarded, reason } => write!(
                f,
                "info string producer finished forwarded {forwarded} reason {reason}"
            ),
            PipelineEvent::Aborted {
                worker_id: Some(id),
                error,
            } => write!(f, "info string worker {id} aborted: {error}"),
            PipelineEvent::Aborted {
                worker_id: None,
                error,
            } => write!(f, "info string producer aborted: {error}"),
        }
    }
}

/// Send `event` if anyone is listening. A hung-up receiver is not an error.
#[inline]
pub(crate) fn emit(events: Option<&Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::{emit, PipelineEvent, ProducerExit};
    use crate::errors::FrontierError;

    #[test]
    fn events_render_as_info_lines() {
        let flushed = PipelineEvent::Flushed {
            worker_id: 2,
            parents: 1,
            children: 20,
            edges_inserted: 20,
        };
        assert_eq!(
            flushed.to_string(),
            "info string worker 2 flushed parents 1 children 20 edges 20"
        );

        let finished = PipelineEvent::ProducerFinished {
            forwarded: 21,
            reason: ProducerExit::Drained,
        };
        assert_eq!(
            finished.to_string(),
            "info string producer finished forwarded 21 reason drained"
        );

        let aborted = PipelineEvent::Aborted {
            worker_id: Some(0),
            error: FrontierError::WriteFailed("disk full".to_owned()),
        };
        assert_eq!(
            aborted.to_string(),
            "info string worker 0 aborted: frontier write failed: disk full"
        );
    }

    #[test]
    fn emit_tolerates_missing_or_closed_receiver() {
        emit(None, PipelineEvent::NoWork { max_move_count: 1 });

        let (tx, rx) = mpsc::channel();
        drop(rx);
        emit(Some(&tx), PipelineEvent::NoWork { max_move_count: 1 });
    }
}
