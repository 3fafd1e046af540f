// Layer 1: Standard library imports
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::FutureExt;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use super::error::ExecutorError;
use crate::mailbox::{Mailbox, MailboxError, MailboxSender, RecvOutcome};
use crate::monitoring::{ExecutorEvent, Monitor, NoopMonitor};

/// A unit of work submitted to an [`Executor`].
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A fixed pool of `worker_count` tokio tasks draining one shared queue.
///
/// Workers are isolated from panics in submitted tasks: a panicking task
/// is caught, logged, and the worker keeps draining the queue. A panic
/// never takes down a sibling worker or the executor itself.
pub struct Executor {
    sender: MailboxSender<Task>,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
    monitor: Arc<dyn Monitor<ExecutorEvent>>,
}

impl Executor {
    /// Start `worker_count` workers sharing a queue of `queue_capacity`,
    /// discarding executor-level monitoring events.
    pub fn start(worker_count: usize, queue_capacity: usize) -> Self {
        Self::start_with_monitor(worker_count, queue_capacity, Arc::new(NoopMonitor::new()))
    }

    pub fn start_with_monitor(
        worker_count: usize,
        queue_capacity: usize,
        monitor: Arc<dyn Monitor<ExecutorEvent>>,
    ) -> Self {
        let (mailbox, sender) = Mailbox::new(queue_capacity);
        let mailbox = Arc::new(AsyncMutex::new(mailbox));
        let cancel = CancellationToken::new();

        let workers = (0..worker_count.max(1))
            .map(|id| {
                let mailbox = Arc::clone(&mailbox);
                let cancel = cancel.clone();
                let monitor = Arc::clone(&monitor);
                tokio::spawn(Self::worker_loop(id, mailbox, cancel, monitor))
            })
            .collect();

        Self {
            sender,
            cancel,
            workers,
            capacity: queue_capacity,
            monitor,
        }
    }

    async fn worker_loop(
        id: usize,
        mailbox: Arc<AsyncMutex<Mailbox<Task>>>,
        cancel: CancellationToken,
        monitor: Arc<dyn Monitor<ExecutorEvent>>,
    ) {
        loop {
            let outcome = {
                let mut mailbox = mailbox.lock().await;
                mailbox.receive(&cancel).await
            };
            match outcome {
                RecvOutcome::Value(task) => {
                    if AssertUnwindSafe(task).catch_unwind().await.is_err() {
                        error!(worker = id, "executor task panicked; isolating and continuing");
                        monitor.record(ExecutorEvent::TaskPanicked {
                            occurred_at: chrono::Utc::now(),
                            worker: id,
                        });
                    }
                }
                RecvOutcome::Cancelled => {
                    debug!(worker = id, "executor worker cancelled");
                    break;
                }
                RecvOutcome::Closed => {
                    debug!(worker = id, "executor worker draining closed queue");
                    break;
                }
            }
        }
    }

    /// Submit a task. Non-blocking: returns `QueueFull` rather than
    /// waiting for room.
    pub fn submit(&self, task: Task) -> Result<(), ExecutorError> {
        self.sender.send(task).map_err(|err| match err {
            MailboxError::Full { capacity } => {
                self.monitor.record(ExecutorEvent::QueueFull {
                    occurred_at: chrono::Utc::now(),
                    capacity,
                });
                ExecutorError::QueueFull { capacity }
            }
            MailboxError::Closed => ExecutorError::Closed,
        })
    }

    pub fn queue_capacity(&self) -> usize {
        self.capacity
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting new work, let queued tasks drain, and wait up to
    /// `deadline` for every worker to exit.
    pub async fn shutdown(mut self, deadline: Duration) -> Result<(), ExecutorError> {
        self.cancel.cancel();
        let joins = futures::future::join_all(self.workers.drain(..));
        match tokio::time::timeout(deadline, joins).await {
            Ok(results) => {
                for result in results {
                    if let Err(join_err) = result {
                        warn!(error = %join_err, "executor worker task did not join cleanly");
                    }
                }
                Ok(())
            }
            Err(_) => Err(ExecutorError::ShutdownTimeout),
        }
    }
}
