// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 3: Internal module imports
use super::error::ReactorError;
use crate::executor::{Executor, Task};
use crate::monitoring::{Monitor, NoopMonitor, ReactorEvent};

/// A callback scheduled onto a [`Reactor`]. Identical shape to
/// [`crate::executor::Task`] — a reactor is an executor with exactly one
/// worker, not a different primitive.
pub type Callback = Task;

/// A strictly-ordered, single-worker event loop.
pub struct Reactor {
    executor: Executor,
    monitor: Arc<dyn Monitor<ReactorEvent>>,
}

impl Reactor {
    /// Start a reactor backed by a queue of `queue_capacity` callbacks,
    /// discarding reactor-level monitoring events.
    pub fn start(queue_capacity: usize) -> Self {
        Self::start_with_monitor(queue_capacity, Arc::new(NoopMonitor::new()))
    }

    pub fn start_with_monitor(
        queue_capacity: usize,
        monitor: Arc<dyn Monitor<ReactorEvent>>,
    ) -> Self {
        Self {
            executor: Executor::start(1, queue_capacity),
            monitor,
        }
    }

    /// Schedule a callback. Non-blocking: returns `QueueFull` rather than
    /// waiting for room in the queue.
    pub fn execute(&self, callback: Callback) -> Result<(), ReactorError> {
        self.executor.submit(callback).map_err(|err| {
            let err = ReactorError::from(err);
            if let ReactorError::QueueFull { capacity } = err {
                self.monitor.record(ReactorEvent::QueueFull {
                    occurred_at: chrono::Utc::now(),
                    capacity,
                });
            }
            err
        })
    }

    pub fn queue_capacity(&self) -> usize {
        self.executor.queue_capacity()
    }

    /// Stop accepting new callbacks, let the queue drain, and wait up to
    /// `deadline` for the worker to exit.
    pub async fn stop(self, deadline: Duration) -> Result<(), ReactorError> {
        self.executor.shutdown(deadline).await.map_err(ReactorError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn callbacks_execute_in_submission_order() {
        let reactor = Reactor::start(16);
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            reactor
                .execute(Box::pin(async move {
                    order.lock().push(i);
                }))
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
        reactor.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn callbacks_never_overlap() {
        let reactor = Reactor::start(16);
        let active = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let max_seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        for _ in 0..20 {
            let active = Arc::clone(&active);
            let max_seen = Arc::clone(&max_seen);
            reactor
                .execute(Box::pin(async move {
                    let now = active.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, std::sync::atomic::Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    active.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                }))
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(max_seen.load(std::sync::atomic::Ordering::SeqCst), 1);
        reactor.stop(Duration::from_secs(1)).await.unwrap();
    }
}
