/// Errors surfaced by [`crate::executor::Executor`].
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ExecutorError {
    /// The task queue is at capacity; the caller should apply its own
    /// backpressure policy rather than retry blindly.
    #[error("executor queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// The executor has already been shut down.
    #[error("executor is closed")]
    Closed,

    /// Workers did not all finish within the shutdown deadline.
    #[error("executor shutdown did not complete within the deadline")]
    ShutdownTimeout,
}
