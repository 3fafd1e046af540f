// Layer 1: Standard library imports
// (none)

/// Errors returned by non-blocking `Mailbox` operations.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum MailboxError {
    /// Capacity would be exceeded by a non-blocking send.
    #[error("mailbox is full (capacity: {capacity})")]
    Full { capacity: usize },

    /// The mailbox has been closed; no further sends are accepted.
    #[error("mailbox is closed")]
    Closed,
}

/// The three possible outcomes of `Mailbox::receive`.
#[derive(Debug)]
pub enum RecvOutcome<T> {
    /// A value was dequeued.
    Value(T),
    /// The caller's cancellation token fired before a value arrived.
    Cancelled,
    /// The mailbox is closed and fully drained.
    Closed,
}

impl<T> RecvOutcome<T> {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}
