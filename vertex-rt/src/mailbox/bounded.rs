// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Layer 3: Internal module imports
use super::metrics::MailboxMetrics;
use super::traits::{MailboxError, RecvOutcome};

/// A bounded FIFO mailbox: the receiving half, owned exclusively by one
/// reader (a `Reactor` worker, an `Executor` worker, a `Consumer`
/// processor, ...).
pub struct Mailbox<T> {
    receiver: mpsc::Receiver<T>,
    capacity: usize,
    closed: Arc<AtomicBool>,
    metrics: Arc<MailboxMetrics>,
}

/// The cloneable sending half of a [`Mailbox`].
#[derive(Clone)]
pub struct MailboxSender<T> {
    sender: mpsc::Sender<T>,
    capacity: usize,
    closed: Arc<AtomicBool>,
    metrics: Arc<MailboxMetrics>,
}

impl<T: Send + 'static> Mailbox<T> {
    /// Create a bounded mailbox pair with the given capacity.
    ///
    /// Capacity is fixed at construction — resizing is not supported.
    pub fn new(capacity: usize) -> (Self, MailboxSender<T>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let closed = Arc::new(AtomicBool::new(false));
        let metrics = Arc::new(MailboxMetrics::new());

        let mailbox = Self {
            receiver,
            capacity,
            closed: Arc::clone(&closed),
            metrics: Arc::clone(&metrics),
        };
        let sender = MailboxSender {
            sender,
            capacity,
            closed,
            metrics,
        };
        (mailbox, sender)
    }

    /// Receive the next value, or report cancellation/closure.
    ///
    /// Close is drain-then-closed: buffered values are still delivered
    /// after `close()` and `Closed` is only returned once the channel is
    /// both closed and empty.
    pub async fn receive(&mut self, cancel: &CancellationToken) -> RecvOutcome<T> {
        tokio::select! {
            _ = cancel.cancelled() => RecvOutcome::Cancelled,
            received = self.receiver.recv() => match received {
                Some(value) => {
                    self.metrics.record_received();
                    RecvOutcome::Value(value)
                }
                None => RecvOutcome::Closed,
            },
        }
    }

    /// Idempotent close: further sends return `Closed`; buffered values
    /// already in the channel are still drained by `receive`.
    pub fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.receiver.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Best-effort observation of the current queue depth.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> &MailboxMetrics {
        &self.metrics
    }
}

impl<T: Send + 'static> MailboxSender<T> {
    /// Non-blocking send. Never suspends the caller.
    pub fn send(&self, value: T) -> Result<(), MailboxError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MailboxError::Closed);
        }
        self.sender.try_send(value).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                self.metrics.record_dropped();
                MailboxError::Full {
                    capacity: self.capacity,
                }
            }
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })?;
        self.metrics.record_sent();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.sender.is_closed()
    }

    pub fn metrics(&self) -> &MailboxMetrics {
        &self.metrics
    }
}
