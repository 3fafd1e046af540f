// Layer 1: Standard library imports
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::FutureExt;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

// Layer 3: Internal module imports
use super::backpressure::{AdmissionToken, BackpressureController};
use super::config::AdmissionConfig;
use super::error::AdmissionError;
use super::http::{HttpRequestContext, ResponseWriter};
use crate::monitoring::{AdmissionEvent, Monitor, NoopMonitor};

const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// The two-stage admission gate in front of a deployment's request
/// handling: a capacity token (stage one), then a bounded "admitted but
/// not yet dispatched" queue (stage two). A request that clears both
/// stages holds an [`AdmissionGuard`] until it finishes.
pub struct AdmissionLayer {
    controller: BackpressureController,
    queue_depth: Arc<AtomicUsize>,
    queue_capacity: usize,
    rejected: AtomicUsize,
    accepted: AtomicUsize,
    monitor: Arc<dyn Monitor<AdmissionEvent>>,
}

/// Held by an admitted request; releases both admission stages on drop.
pub struct AdmissionGuard {
    _token: AdmissionToken,
    queue_depth: Arc<AtomicUsize>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.queue_depth.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AdmissionLayer {
    pub fn new(config: AdmissionConfig) -> Self {
        Self::with_monitor(config, Arc::new(NoopMonitor::new()))
    }

    pub fn with_monitor(config: AdmissionConfig, monitor: Arc<dyn Monitor<AdmissionEvent>>) -> Self {
        Self {
            controller: BackpressureController::new(config.capacity_tokens),
            queue_depth: Arc::new(AtomicUsize::new(0)),
            queue_capacity: config.queue_capacity,
            rejected: AtomicUsize::new(0),
            accepted: AtomicUsize::new(0),
            monitor,
        }
    }

    /// Extract the request's correlation id, minting one if the caller
    /// didn't send an `X-Request-ID` header.
    pub fn request_id(&self, ctx: &impl HttpRequestContext) -> String {
        ctx.header(REQUEST_ID_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Attempt to admit one request. On success, the returned
    /// [`AdmissionGuard`] must be held for the lifetime of the request's
    /// processing. On failure, the exact 503 body to write is returned
    /// via [`AdmissionRejection`].
    ///
    /// Stage one (the capacity token) is a semaphore of size `N`; current
    /// load can never exceed `N` once a token has been acquired, so stage
    /// two's check gates against `N` too rather than the smaller `M` —
    /// gating against `M` directly would reject requests stage one was
    /// still willing to admit whenever `M < N`, which is the normal case
    /// (`N = M + W`).
    pub fn try_admit(&self) -> Result<AdmissionGuard, AdmissionRejection> {
        let token = self.controller.try_acquire().map_err(|err| {
            self.reject(&err);
            AdmissionRejection::from_error(err)
        })?;

        let depth = self.queue_depth.fetch_add(1, Ordering::SeqCst) + 1;
        if depth > self.controller.capacity() {
            self.queue_depth.fetch_sub(1, Ordering::SeqCst);
            drop(token);
            let err = AdmissionError::QueueFull {
                capacity: self.queue_capacity,
            };
            self.reject(&err);
            return Err(AdmissionRejection::from_error(err));
        }

        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.monitor.record(AdmissionEvent::Accepted {
            occurred_at: chrono::Utc::now(),
        });
        Ok(AdmissionGuard {
            _token: token,
            queue_depth: Arc::clone(&self.queue_depth),
        })
    }

    fn reject(&self, err: &AdmissionError) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(error = %err, "admission rejected request");
        self.monitor.record(AdmissionEvent::Rejected {
            occurred_at: chrono::Utc::now(),
            reason: err.to_string(),
        });
    }

    /// Admit a request and, on rejection, write the 503 body directly to
    /// `resp`. Convenience wrapper around [`Self::try_admit`] for
    /// adapters that don't need the rejection body themselves.
    pub fn admit(
        &self,
        ctx: &impl HttpRequestContext,
        resp: &mut impl ResponseWriter,
    ) -> Result<AdmissionGuard, AdmissionError> {
        resp.write_header(REQUEST_ID_HEADER, &self.request_id(ctx));
        match self.try_admit() {
            Ok(guard) => Ok(guard),
            Err(rejection) => {
                rejection.write_to(resp);
                Err(rejection.error)
            }
        }
    }

    /// Admit a request and, if admitted, run `handle` under a panic
    /// guard — the shape of one of the admission layer's `W`
    /// request-processing workers, minus the pull-from-a-mailbox
    /// plumbing an adapter's own async runtime already gives it for
    /// free. `handle` is expected to write a response to `resp` itself
    /// on success; a panic inside it is caught and translated into the
    /// documented `500 handler_panic` body instead of propagating.
    ///
    /// The backpressure token (and, transitively, the queue slot) is
    /// released when the returned future completes, regardless of
    /// whether `handle` panicked.
    pub async fn dispatch<F, Fut>(
        &self,
        ctx: &impl HttpRequestContext,
        resp: &mut impl ResponseWriter,
        handle: F,
    ) where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        resp.write_header(REQUEST_ID_HEADER, &self.request_id(ctx));
        let guard = match self.try_admit() {
            Ok(guard) => guard,
            Err(rejection) => {
                rejection.write_to(resp);
                return;
            }
        };

        if AssertUnwindSafe(handle()).catch_unwind().await.is_err() {
            error!("admission handler panicked; isolating and returning 500");
            self.monitor.record(AdmissionEvent::HandlerPanicked {
                occurred_at: chrono::Utc::now(),
            });
            resp.write_status(500);
            resp.write_json_body(&json!({
                "error": "handler_panic",
                "message": "Request handler failed",
            }));
        }

        drop(guard);
    }

    pub fn capacity_tokens(&self) -> usize {
        self.controller.capacity()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn utilization(&self) -> f64 {
        self.controller.utilization()
    }

    /// Requests currently admitted but not yet dropped (queued or being
    /// processed) — the backpressure controller's current load `L`.
    pub fn queued(&self) -> usize {
        self.queue_depth.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Relaxed)
    }
}

/// The exact HTTP response an admission rejection produces: always a
/// `503` with a JSON body naming the reason, so every adapter crate
/// emits byte-identical error bodies regardless of HTTP library.
pub struct AdmissionRejection {
    pub status: u16,
    pub body: serde_json::Value,
    pub error: AdmissionError,
}

impl AdmissionRejection {
    fn from_error(error: AdmissionError) -> Self {
        let body = match error {
            AdmissionError::CapacityExhausted { .. } => json!({
                "error": "capacity_exceeded",
                "message": "Server at normal capacity - backpressure applied",
                "code": "BACKPRESSURE",
            }),
            AdmissionError::QueueFull { .. } => json!({
                "error": "queue_full",
                "message": "Server overloaded - backpressure applied",
                "code": "BACKPRESSURE",
            }),
            AdmissionError::Closed => json!({
                "error": "closed",
                "message": "the admission layer is shutting down",
                "code": "BACKPRESSURE",
            }),
        };
        Self {
            status: 503,
            body,
            error,
        }
    }

    pub fn write_to(&self, resp: &mut impl ResponseWriter) {
        resp.write_status(self.status);
        resp.write_json_body(&self.body);
    }
}
