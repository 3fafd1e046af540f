// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free sent/received/dropped counters for one `Mailbox`.
///
/// Counters are sampled, not transactional: readers may observe a send
/// that hasn't yet been reflected in `received_count`, which is fine for
/// metrics/monitoring purposes.
#[derive(Debug, Default)]
pub struct MailboxMetrics {
    sent: AtomicU64,
    received: AtomicU64,
    dropped: AtomicU64,
}

impl MailboxMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Best-effort in-flight estimate: sent minus received.
    pub fn in_flight(&self) -> u64 {
        self.sent_count().saturating_sub(self.received_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_in_flight_count() {
        let m = MailboxMetrics::new();
        m.record_sent();
        m.record_sent();
        m.record_received();
        assert_eq!(m.in_flight(), 1);
    }
}
