//! Shared work queue.
//!
//! A multi-producer, multi-consumer FIFO with timed dequeue. Producers push
//! items and finally `close()` the queue; consumers wait up to a bound for an
//! item and learn from `is_closed()` whether more can still arrive.

use crate::types::WorkItem;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

/// Unbounded work queue of [`WorkItem`]s.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    closed: AtomicBool,
    dequeued: AtomicU64,
    available: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and wake one waiting consumer.
    pub fn push(&self, item: WorkItem) {
        self.lock().push_back(item);
        self.available.notify_one();
    }

    /// Mark the queue as complete. Waiting consumers wake up and drain what
    /// is left.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total number of items handed out to consumers so far.
    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Take the next item without waiting.
    pub fn try_pop(&self) -> Option<WorkItem> {
        let item = self.lock().pop_front();
        if item.is_some() {
            self.dequeued.fetch_add(1, Ordering::Relaxed);
        }
        item
    }

    /// Wait up to `wait` for an item.
    ///
    /// Returns `None` on timeout, or straight away once the queue is closed
    /// and empty.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<WorkItem> {
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before checking so a push between the check
            // and the await is not missed.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            if self.is_closed() {
                return None;
            }
            if timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
