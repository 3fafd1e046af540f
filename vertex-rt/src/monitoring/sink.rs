// Layer 1: Standard library imports
use std::marker::PhantomData;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::events::MonitoringEvent;

/// A sink for typed monitoring events of one kind.
///
/// Distinct from `tracing`: a `Monitor` is for structured, sampled
/// signals a dashboard or alerting pipeline consumes, not for
/// human-readable diagnostic logs.
pub trait Monitor<E: MonitoringEvent>: Send + Sync + 'static {
    fn record(&self, event: E);
}

/// Discards every event. The default for components that don't care to
/// wire up monitoring.
pub struct NoopMonitor<E> {
    _marker: PhantomData<fn(E)>,
}

impl<E> NoopMonitor<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for NoopMonitor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MonitoringEvent> Monitor<E> for NoopMonitor<E> {
    fn record(&self, _event: E) {}
}

/// Buffers every event in memory. Intended for tests and small
/// deployments; not a substitute for an external metrics pipeline.
pub struct InMemoryMonitor<E> {
    events: Mutex<Vec<E>>,
}

impl<E> InMemoryMonitor<E> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Default for InMemoryMonitor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MonitoringEvent + Clone> InMemoryMonitor<E> {
    pub fn events(&self) -> Vec<E> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: MonitoringEvent> Monitor<E> for InMemoryMonitor<E> {
    fn record(&self, event: E) {
        self.events.lock().push(event);
    }
}
