use crate::executor::ExecutorError;

/// Errors surfaced by [`crate::reactor::Reactor`].
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ReactorError {
    #[error("reactor queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    #[error("reactor is closed")]
    Closed,

    #[error("reactor shutdown did not complete within the deadline")]
    ShutdownTimeout,
}

impl From<ExecutorError> for ReactorError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::QueueFull { capacity } => Self::QueueFull { capacity },
            ExecutorError::Closed => Self::Closed,
            ExecutorError::ShutdownTimeout => Self::ShutdownTimeout,
        }
    }
}
