//! Bounded blocking queue between the producer and the workers.
//!
//! Every pushed item counts as unfinished until a consumer calls
//! `task_done` for it, so the producer can tell "nothing queued and nothing
//! in flight" apart from "queue momentarily empty".

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, PartialEq, Eq)]
pub enum Push<T> {
    Queued,
    /// Still full when the wait ran out; the item is handed back.
    Full(T),
    Closed(T),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Pop<T> {
    Item(T),
    TimedOut,
    /// Closed and nothing left to hand out.
    Closed,
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
}

#[derive(Debug)]
pub struct WorkQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    /// Signalled when an item arrives or the queue closes.
    readable: Condvar,
    /// Signalled when space frees up or a task completes.
    settled: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                unfinished: 0,
                closed: false,
            }),
            readable: Condvar::new(),
            settled: Condvar::new(),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Items pushed but not yet acknowledged with `task_done`.
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }

    /// Enqueue `item`, waiting up to `timeout` for space.
    pub fn push_timeout(&self, item: T, timeout: Duration) -> Push<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if state.closed {
                return Push::Closed(item);
            }
            if state.items.len() < self.capacity {
                state.items.push_back(item);
                state.unfinished += 1;
                drop(state);
                self.readable.notify_one();
                return Push::Queued;
            }
            let now = Instant::now();
            if now >= deadline {
                return Push::Full(item);
            }
            state = self
                .settled
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        let item = self.lock().items.pop_front();
        if item.is_some() {
            self.settled.notify_all();
        }
        item
    }

    /// Dequeue one item, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Pop<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.settled.notify_all();
                return Pop::Item(item);
            }
            if state.closed {
                return Pop::Closed;
            }
            let now = Instant::now();
            if now >= deadline {
                return Pop::TimedOut;
            }
            state = self
                .readable
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Acknowledge one previously popped item.
    pub fn task_done(&self) {
        let mut state = self.lock();
        state.unfinished = state.unfinished.saturating_sub(1);
        let all_done = state.unfinished == 0;
        drop(state);
        if all_done {
            self.settled.notify_all();
        }
    }

    /// Wait up to `timeout` for every pushed item to be acknowledged.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.unfinished > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .settled
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Refuse further pushes and wake every waiter. Queued items can still be popped.
    pub fn close(&self) {
        self.lock().closed = true;
        self.readable.notify_all();
        self.settled.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
