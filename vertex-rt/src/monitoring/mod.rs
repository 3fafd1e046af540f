//! Typed, sampled observability events — distinct from the free-text
//! `tracing` spans/events emitted throughout the crate.
//!
//! `tracing` answers "what is this one worker doing right now"; `Monitor`
//! answers "how many admission rejections happened in the last minute" —
//! structured events a dashboard or alerting pipeline can consume without
//! parsing log lines.

mod events;
mod sink;

pub use events::{
    AdmissionEvent, BusEvent, EventSeverity, ExecutorEvent, MailboxEvent, MonitoringEvent,
    ReactorEvent, SupervisionEvent,
};
pub use sink::{InMemoryMonitor, Monitor, NoopMonitor};
