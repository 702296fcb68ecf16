//! Task scheduling and concurrency limiting for the crawl
//!
//! Every fetch runs as its own tokio task. The scheduler tracks how many
//! tasks are still outstanding so the crawl can tell when it is finished,
//! and hands out semaphore permits that bound how many requests are on the
//! wire at once.
//!
//! A task only holds a permit while it talks to the network. Parsing and
//! submitting children happen without one, so a task that discovers new
//! work never waits on a permit another task holds.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
struct SchedulerState {
    /// Bounds in-flight requests
    permits: Arc<Semaphore>,
    /// Spawned tasks that have not finished
    pending: AtomicUsize,
    /// Woken when `pending` drops to zero or the crawl is cancelled
    idle: Notify,
    cancelled: AtomicBool,
}

/// Decrements the pending count when a task finishes, even by panic
struct PendingGuard(Arc<SchedulerState>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Cloneable handle to the crawl's task scheduler
#[derive(Debug, Clone)]
pub struct Scheduler {
    state: Arc<SchedulerState>,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_in_flight` concurrent requests
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            state: Arc::new(SchedulerState {
                permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Spawns a crawl task
    ///
    /// The task is counted as pending before this returns, so a caller that
    /// spawns children before finishing can never let the count reach zero
    /// early.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(Arc::clone(&self.state));

        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    /// Waits for a network permit
    ///
    /// Returns `None` once the crawl has been cancelled.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.state.permits).acquire_owned().await.ok()
    }

    /// Resolves when no task is pending, or the crawl was cancelled
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 || self.is_cancelled() {
                return;
            }

            notified.await;
        }
    }

    /// Stops handing out permits and wakes any idle waiter
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.permits.close();
        self.state.idle.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Number of spawned tasks that have not finished
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::SeqCst)
    }
}
