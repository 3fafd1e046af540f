// Layer 1: Standard library imports
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::core::Bus;
use crate::mailbox::{Mailbox, MailboxError, MailboxSender, RecvOutcome};
use crate::message::Message;
use crate::monitoring::{BusEvent, Monitor};
use crate::util::Address;

/// A message handler bound to one or more [`Address`]es on a [`Bus`].
///
/// Handlers receive a clone of the `Bus` with every message so they can
/// reply (via `reply_address`), forward to other addresses, or issue
/// their own requests — without the bus needing a separate callback
/// shape for "things that reply" versus "things that don't".
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, message: Message, bus: Bus);
}

/// One subscription: an address, a dedicated inbox, and the task
/// draining it.
///
/// Each `Consumer` owns a private single-reader `Mailbox`, so messages
/// delivered to the *same* consumer are always processed one at a time
/// and in delivery order — concurrency happens *across* consumers, never
/// within one.
pub struct Consumer {
    id: Uuid,
    address: Address,
    sender: MailboxSender<Message>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Consumer {
    pub(crate) fn spawn(
        address: Address,
        handler: Arc<dyn Handler>,
        bus: Bus,
        queue_capacity: usize,
        monitor: Arc<dyn Monitor<BusEvent>>,
    ) -> Self {
        let (mailbox, sender) = Mailbox::new(queue_capacity);
        let cancel = CancellationToken::new();
        let id = Uuid::new_v4();
        let task = tokio::spawn(Self::process_loop(
            mailbox,
            cancel.clone(),
            handler,
            bus,
            address.clone(),
            monitor,
        ));

        Self {
            id,
            address,
            sender,
            cancel,
            task,
        }
    }

    async fn process_loop(
        mut mailbox: Mailbox<Message>,
        cancel: CancellationToken,
        handler: Arc<dyn Handler>,
        bus: Bus,
        address: Address,
        monitor: Arc<dyn Monitor<BusEvent>>,
    ) {
        loop {
            match mailbox.receive(&cancel).await {
                RecvOutcome::Value(message) => {
                    let handling = handler.handle(message, bus.clone());
                    if AssertUnwindSafe(handling).catch_unwind().await.is_err() {
                        error!(%address, "consumer handler panicked; isolating and continuing");
                        monitor.record(BusEvent::ConsumerPanicked {
                            occurred_at: chrono::Utc::now(),
                            address: address.to_string(),
                        });
                    }
                }
                RecvOutcome::Cancelled | RecvOutcome::Closed => break,
            }
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn address(&self) -> &Address {
        &self.address
    }

    pub(crate) fn deliver(&self, message: Message) -> Result<(), MailboxError> {
        self.sender.send(message)
    }

    pub(crate) async fn close(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// A handle returned by [`Bus::consumer`] used to unsubscribe.
///
/// Dropping the handle leaves the subscription active — callers must
/// call [`ConsumerHandle::close`] to unsubscribe, matching the bus's
/// "consumers live until explicitly closed" lifecycle.
pub struct ConsumerHandle {
    pub(crate) bus: Bus,
    pub(crate) address: Address,
    pub(crate) id: Uuid,
}

impl ConsumerHandle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Unsubscribe and wait for the consumer's task to stop.
    pub async fn close(self) {
        self.bus.remove_consumer(&self.address, self.id).await;
    }
}
