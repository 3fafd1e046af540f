// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::warn;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::consumer::{Consumer, ConsumerHandle, Handler};
use super::error::BusError;
use super::registry::{self, Registry};
use crate::mailbox::MailboxError;
use crate::message::{Body, Message};
use crate::monitoring::{BusEvent, Monitor, NoopMonitor};
use crate::util::{Address, CorrelationId};

/// Implementation cap on a [`Bus::request`] timeout: five minutes.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Tunables for a [`Bus`] instance.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Capacity of every consumer's private inbox, including the
    /// ephemeral reply consumers `request` creates.
    pub consumer_queue_capacity: usize,
    /// Used by [`Bus::request_default`]; `request` always takes an
    /// explicit timeout.
    pub default_request_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            consumer_queue_capacity: 256,
            default_request_timeout: Duration::from_secs(5),
        }
    }
}

/// The in-process message bus.
///
/// Cheap to clone — every clone shares the same consumer registry, so a
/// `Bus` handle can be handed to every [`Handler`] and `Component`
/// without any further wiring.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    config: BusConfig,
    monitor: Arc<dyn Monitor<BusEvent>>,
    closed: AtomicBool,
}

impl Bus {
    pub fn new(config: BusConfig) -> Self {
        Self::with_monitor(config, Arc::new(NoopMonitor::new()))
    }

    pub fn with_monitor(config: BusConfig, monitor: Arc<dyn Monitor<BusEvent>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Registry::new(),
                config,
                monitor,
                closed: AtomicBool::new(false),
            }),
        }
    }

    fn ensure_open(&self) -> Result<(), BusError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            Err(BusError::Closed)
        } else {
            Ok(())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Close every registered consumer's mailbox, drop the registry, and
    /// refuse further `publish`/`send`/`request` calls with
    /// [`BusError::Closed`]. Idempotent — closing an already-closed bus
    /// is a no-op.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for consumer in registry::drain_all(&self.inner.registry) {
            consumer.close().await;
        }
    }

    /// Register `handler` at `address`. Multiple consumers may share an
    /// address: `publish` fans out to all of them, `send` picks one.
    pub fn consumer(&self, address: Address, handler: Arc<dyn Handler>) -> ConsumerHandle {
        let consumer = Consumer::spawn(
            address.clone(),
            handler,
            self.clone(),
            self.inner.config.consumer_queue_capacity,
            Arc::clone(&self.inner.monitor),
        );
        let id = consumer.id();
        registry::register(&self.inner.registry, address.clone(), consumer);
        ConsumerHandle {
            bus: self.clone(),
            address,
            id,
        }
    }

    pub(crate) async fn remove_consumer(&self, address: &Address, id: Uuid) {
        if let Some(consumer) = registry::unregister(&self.inner.registry, address, id) {
            consumer.close().await;
        }
    }

    /// Deliver `body` to every consumer registered at `address`.
    ///
    /// Returns the number of consumers the message was successfully
    /// enqueued to. An address with no consumers is not an error — it
    /// simply delivers to zero recipients.
    pub fn publish(&self, address: &Address, body: Body) -> Result<usize, BusError> {
        self.ensure_open()?;
        let message = Message::new(body);
        let Some(group) = self.inner.registry.get(address) else {
            return Ok(0);
        };
        let mut delivered = 0;
        for consumer in group.read().iter() {
            match consumer.deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(%address, error = %err, "publish: consumer rejected message");
                    self.inner.monitor.record(BusEvent::DeliveryRejected {
                        occurred_at: chrono::Utc::now(),
                        address: address.as_str().to_string(),
                    });
                }
            }
        }
        Ok(delivered)
    }

    /// Deliver `body` to exactly one consumer at `address`: the
    /// first-registered consumer among those currently subscribed there.
    pub fn send(&self, address: &Address, body: Body) -> Result<(), BusError> {
        let message = Message::new(body);
        self.deliver_one(address, message)
    }

    /// Deliver a fully-built [`Message`] to one consumer at `address`,
    /// preserving whatever correlation id/reply address it already
    /// carries. Used by [`crate::message::Message::reply`] so a reply
    /// keeps the original request's correlation id.
    pub(crate) fn deliver_prebuilt(&self, address: &Address, message: Message) -> Result<(), BusError> {
        self.deliver_one(address, message)
    }

    fn deliver_one(&self, address: &Address, message: Message) -> Result<(), BusError> {
        self.ensure_open()?;
        let group = self
            .inner
            .registry
            .get(address)
            .ok_or_else(|| BusError::NoConsumer {
                address: address.as_str().to_string(),
            })?;
        let guard = group.read();
        let consumer = guard.pick().ok_or_else(|| BusError::NoConsumer {
            address: address.as_str().to_string(),
        })?;
        consumer.deliver(message).map_err(|err| match err {
            MailboxError::Full { .. } => BusError::Timeout,
            other => BusError::from(other),
        })
    }

    /// Send `body` to `address` and await exactly one reply, via a
    /// private single-shot consumer registered on an ephemeral
    /// `reply.<uuid>` address for the duration of the call.
    ///
    /// The ephemeral consumer is always unregistered before `request`
    /// returns, including on timeout — a caller that times out repeatedly
    /// cannot leak consumers or grow the registry.
    pub async fn request(
        &self,
        address: &Address,
        body: Body,
        timeout: Duration,
    ) -> Result<Message, BusError> {
        if timeout.is_zero() || timeout > MAX_REQUEST_TIMEOUT {
            return Err(BusError::InvalidTimeout { timeout });
        }
        self.ensure_open()?;

        let reply_address = Address::new_reply();
        let (tx, rx) = oneshot::channel();
        let handler: Arc<dyn Handler> = Arc::new(ReplyHandler::new(tx));
        let reply_handle = self.consumer(reply_address.clone(), handler);

        let message = Message::new(body)
            .with_reply_address(reply_address)
            .with_correlation_id(CorrelationId::new());

        if let Err(err) = self.deliver_one(address, message) {
            reply_handle.close().await;
            return Err(err);
        }

        let outcome = tokio::time::timeout(timeout, rx).await;
        reply_handle.close().await;

        match outcome {
            Ok(Ok(message)) => Ok(message),
            Ok(Err(_)) => Err(BusError::ReplyChannelClosed),
            Err(_) => {
                self.inner.monitor.record(BusEvent::RequestTimedOut {
                    occurred_at: chrono::Utc::now(),
                    address: address.as_str().to_string(),
                });
                Err(BusError::Timeout)
            }
        }
    }

    /// [`Bus::request`] using [`BusConfig::default_request_timeout`].
    pub async fn request_default(&self, address: &Address, body: Body) -> Result<Message, BusError> {
        self.request(address, body, self.inner.config.default_request_timeout)
            .await
    }

    pub fn consumer_count(&self, address: &Address) -> usize {
        self.inner
            .registry
            .get(address)
            .map(|group| group.read().iter().count())
            .unwrap_or(0)
    }
}

/// A one-shot [`Handler`] used internally by [`Bus::request`] to capture
/// exactly one reply and forward it through a oneshot channel.
struct ReplyHandler {
    tx: Mutex<Option<oneshot::Sender<Message>>>,
}

impl ReplyHandler {
    fn new(tx: oneshot::Sender<Message>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }
}

#[async_trait]
impl Handler for ReplyHandler {
    async fn handle(&self, message: Message, _bus: Bus) {
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(message);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(&self, _message: Message, _bus: Bus) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct EchoHandler;

    #[async_trait]
    impl Handler for EchoHandler {
        async fn handle(&self, message: Message, bus: Bus) {
            let body = message.body().clone();
            let _ = message.reply(&bus, body);
        }
    }

    #[tokio::test]
    async fn publish_fans_out_to_every_consumer() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("events.created").unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let handler = Arc::new(CountingHandler {
                count: Arc::clone(&count),
            });
            handles.push(bus.consumer(address.clone(), handler));
        }

        bus.publish(&address, Body::from("x")).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        for handle in handles {
            handle.close().await;
        }
    }

    #[tokio::test]
    async fn send_targets_exactly_one_consumer() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("work.jobs").unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let h1 = bus.consumer(
            address.clone(),
            Arc::new(CountingHandler {
                count: Arc::clone(&count),
            }),
        );
        let h2 = bus.consumer(
            address.clone(),
            Arc::new(CountingHandler {
                count: Arc::clone(&count),
            }),
        );

        bus.send(&address, Body::from("x")).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        h1.close().await;
        h2.close().await;
    }

    #[tokio::test]
    async fn send_to_unknown_address_is_no_consumer() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("nobody.home").unwrap();
        let err = bus.send(&address, Body::from("x")).unwrap_err();
        assert!(matches!(err, BusError::NoConsumer { .. }));
    }

    #[tokio::test]
    async fn request_timeout_of_zero_or_negative_duration_is_invalid() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("svc.whatever").unwrap();
        let err = bus
            .request(&address, Body::from("x"), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::InvalidTimeout { .. }));
    }

    #[tokio::test]
    async fn request_timeout_at_the_five_minute_cap_is_accepted() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("echo").unwrap();
        let handle = bus.consumer(address.clone(), Arc::new(EchoHandler));

        let reply = bus
            .request(&address, Body::from("ping"), MAX_REQUEST_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(reply.body().as_bytes(), b"ping");
        handle.close().await;
    }

    #[tokio::test]
    async fn request_timeout_over_the_five_minute_cap_is_invalid() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("svc.whatever").unwrap();
        let err = bus
            .request(&address, Body::from("x"), MAX_REQUEST_TIMEOUT + Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::InvalidTimeout { .. }));
    }

    #[tokio::test]
    async fn request_receives_the_reply() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("echo").unwrap();
        let handle = bus.consumer(address.clone(), Arc::new(EchoHandler));

        let reply = bus
            .request(&address, Body::from("ping"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply.body().as_bytes(), b"ping");

        handle.close().await;
    }

    #[tokio::test]
    async fn request_times_out_and_leaves_no_registered_consumer() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("black.hole").unwrap();
        struct Silent;
        #[async_trait]
        impl Handler for Silent {
            async fn handle(&self, _message: Message, _bus: Bus) {}
        }
        let handle = bus.consumer(address.clone(), Arc::new(Silent));

        let err = bus
            .request(&address, Body::from("ping"), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::Timeout));

        // the ephemeral reply consumer must not remain registered
        assert_eq!(bus.consumer_count(&address), 1);
        handle.close().await;
    }

    #[tokio::test]
    async fn close_rejects_further_operations_and_is_idempotent() {
        let bus = Bus::new(BusConfig::default());
        let address = Address::new("svc.whatever").unwrap();
        let handle = bus.consumer(
            address.clone(),
            Arc::new(CountingHandler {
                count: Arc::new(AtomicUsize::new(0)),
            }),
        );

        bus.close().await;
        bus.close().await; // idempotent, does not hang or panic

        assert!(bus.is_closed());
        assert!(matches!(
            bus.publish(&address, Body::from("x")),
            Err(BusError::Closed)
        ));
        assert!(matches!(
            bus.send(&address, Body::from("x")),
            Err(BusError::Closed)
        ));
        assert!(matches!(
            bus.request(&address, Body::from("x"), Duration::from_millis(50)).await,
            Err(BusError::Closed)
        ));

        // the handle was already torn down by `close`; dropping it is fine.
        drop(handle);
    }

    #[tokio::test]
    async fn a_panicking_consumer_is_reported_to_the_monitor() {
        use crate::monitoring::InMemoryMonitor;

        struct PanicsOnThird {
            count: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Handler for PanicsOnThird {
            async fn handle(&self, _message: Message, _bus: Bus) {
                let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
                if n % 3 == 0 {
                    panic!("synthetic panic on message {n}");
                }
            }
        }

        let monitor = Arc::new(InMemoryMonitor::new());
        let bus = Bus::with_monitor(BusConfig::default(), monitor.clone());
        let address = Address::new("svc.flaky").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = bus.consumer(address.clone(), Arc::new(PanicsOnThird { count }));

        for i in 0..10 {
            bus.publish(&address, Body::from(i.to_string().as_str())).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let panics = monitor
            .events()
            .into_iter()
            .filter(|e| matches!(e, BusEvent::ConsumerPanicked { .. }))
            .count();
        assert_eq!(panics, 3);

        handle.close().await;
    }
}
