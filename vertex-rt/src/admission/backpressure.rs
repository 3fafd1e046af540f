// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

// Layer 3: Internal module imports
use super::error::AdmissionError;

/// A capacity token: while held, it counts against
/// [`BackpressureController`]'s concurrency limit. Releasing is
/// automatic on drop.
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

/// Bounds how many admitted requests may be in flight at once.
///
/// This is the first of the admission layer's two backpressure stages —
/// a fixed pool of tokens gating entry, independent of the second
/// stage's request queue.
pub struct BackpressureController {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl BackpressureController {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
            capacity: capacity.max(1),
        }
    }

    /// Acquire a token without waiting. Returns `CapacityExhausted` if
    /// none are free.
    pub fn try_acquire(&self) -> Result<AdmissionToken, AdmissionError> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map(|permit| AdmissionToken { _permit: permit })
            .map_err(|_| AdmissionError::CapacityExhausted {
                in_use: self.in_use(),
                capacity: self.capacity,
            })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Fraction of tokens currently in use, in `[0.0, 1.0]`.
    pub fn utilization(&self) -> f64 {
        self.in_use() as f64 / self.capacity as f64
    }
}
