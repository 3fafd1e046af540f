/// Errors surfaced by [`crate::admission::AdmissionLayer`].
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// Every capacity token is in use; the request was rejected before
    /// it was even queued.
    #[error("admission capacity exhausted ({in_use}/{capacity} tokens in use)")]
    CapacityExhausted { in_use: usize, capacity: usize },

    /// A token was acquired but the request queue behind it was full.
    #[error("admission queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// The admission layer has been shut down.
    #[error("admission layer is closed")]
    Closed,
}
