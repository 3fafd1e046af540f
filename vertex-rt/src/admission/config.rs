// Layer 1: Standard library imports
use std::time::Duration;

// Layer 3: Internal module imports
use crate::config::{ConfigError, ConfigMap};

/// Tunables for an [`crate::admission::AdmissionLayer`], derived from a
/// [`ConfigMap`] rather than requiring a dedicated config struct per
/// deployment.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Concurrency limit enforced by the [`crate::admission::BackpressureController`].
    /// This is the spec's "normal capacity" `N`.
    pub capacity_tokens: usize,
    /// Depth of the second-stage request queue (`M`).
    pub queue_capacity: usize,
    pub request_timeout: Duration,
    /// `http_addr` — listen address for the HTTP adapter. The core never
    /// binds a socket itself; this is forwarded for the adapter to use.
    pub http_addr: Option<String>,
    /// `read_timeout` — per-connection read deadline, forwarded to the adapter.
    pub read_timeout: Option<Duration>,
    /// `write_timeout` — per-connection write deadline, forwarded to the adapter.
    pub write_timeout: Option<Duration>,
}

impl AdmissionConfig {
    /// Read tunables out of `config`.
    ///
    /// `capacity_tokens` is either an explicit `max_ccu`, or — if absent —
    /// `max_queue + workers`, scaled by `utilization_percent` (default
    /// 100). This mirrors sizing a worker pool's admission window off the
    /// pool it feeds rather than an unrelated number a deployer has to
    /// keep in sync by hand.
    pub fn from_map(config: &ConfigMap) -> Result<Self, ConfigError> {
        let workers = config.get_integer_or("workers", 4)?.max(1) as usize;
        let queue_capacity = config.get_integer_or("max_queue", 64)?.max(0) as usize;
        let utilization_percent = config.get_float_or("utilization_percent", 100.0)?;
        let explicit_ccu = config.get_integer_or("max_ccu", 0)?;

        let base = if explicit_ccu > 0 {
            explicit_ccu as usize
        } else {
            queue_capacity + workers
        };

        let scaled = (base as f64) * (utilization_percent / 100.0);
        let capacity_tokens = scaled.round().max(1.0) as usize;

        let request_timeout_ms = config.get_integer_or("request_timeout_ms", 30_000)?.max(0) as u64;

        let http_addr = config.get("http_addr").and_then(|v| v.as_str()).map(str::to_string);
        let read_timeout = config
            .get("read_timeout")
            .and_then(|v| v.as_integer())
            .map(|ms| Duration::from_millis(ms.max(0) as u64));
        let write_timeout = config
            .get("write_timeout")
            .and_then(|v| v.as_integer())
            .map(|ms| Duration::from_millis(ms.max(0) as u64));

        Ok(Self {
            capacity_tokens,
            queue_capacity,
            request_timeout: Duration::from_millis(request_timeout_ms),
            http_addr,
            read_timeout,
            write_timeout,
        })
    }

    /// Build a config directly from capacity/queue/timeout, with no
    /// adapter-facing fields set. Mainly useful for tests and for
    /// callers that size the admission layer programmatically instead
    /// of through a [`ConfigMap`].
    pub fn new(capacity_tokens: usize, queue_capacity: usize, request_timeout: Duration) -> Self {
        Self {
            capacity_tokens,
            queue_capacity,
            request_timeout,
            http_addr: None,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derives_capacity_from_queue_plus_workers_by_default() {
        let config = ConfigMap::new().with("workers", 4i64).with("max_queue", 16i64);
        let admission = AdmissionConfig::from_map(&config).unwrap();
        assert_eq!(admission.capacity_tokens, 20);
        assert_eq!(admission.queue_capacity, 16);
    }

    #[test]
    fn explicit_max_ccu_wins() {
        let config = ConfigMap::new()
            .with("workers", 4i64)
            .with("max_queue", 16i64)
            .with("max_ccu", 100i64);
        let admission = AdmissionConfig::from_map(&config).unwrap();
        assert_eq!(admission.capacity_tokens, 100);
    }

    #[test]
    fn utilization_percent_scales_the_derived_capacity() {
        let config = ConfigMap::new()
            .with("workers", 4i64)
            .with("max_queue", 16i64)
            .with("utilization_percent", 50.0);
        let admission = AdmissionConfig::from_map(&config).unwrap();
        assert_eq!(admission.capacity_tokens, 10);
    }

    #[test]
    fn adapter_facing_fields_are_carried_through_but_not_acted_on() {
        let config = ConfigMap::new()
            .with("http_addr", "0.0.0.0:8080")
            .with("read_timeout", 5_000i64)
            .with("write_timeout", 10_000i64);
        let admission = AdmissionConfig::from_map(&config).unwrap();
        assert_eq!(admission.http_addr.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(admission.read_timeout, Some(Duration::from_millis(5_000)));
        assert_eq!(admission.write_timeout, Some(Duration::from_millis(10_000)));
    }

    #[test]
    fn adapter_facing_fields_default_to_none() {
        let admission = AdmissionConfig::from_map(&ConfigMap::new()).unwrap();
        assert_eq!(admission.http_addr, None);
        assert_eq!(admission.read_timeout, None);
        assert_eq!(admission.write_timeout, None);
    }
}
