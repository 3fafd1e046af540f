// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// A coarse severity classification, independent of `tracing::Level` —
/// monitoring consumers care about "does this need paging", `tracing`
/// spans care about "what should show up at debug verbosity".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

/// A type a [`crate::monitoring::Monitor`] can record.
pub trait MonitoringEvent: Send + Sync + 'static {
    fn severity(&self) -> EventSeverity;
    fn kind(&self) -> &'static str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

macro_rules! monitoring_event {
    ($name:ident { $($variant:ident { $($field:ident : $ty:ty),* $(,)? } => $kind:literal, $sev:expr);* $(;)? }) => {
        #[derive(Debug, Clone)]
        pub enum $name {
            $($variant { occurred_at: DateTime<Utc>, $($field: $ty),* }),*
        }

        impl MonitoringEvent for $name {
            fn severity(&self) -> EventSeverity {
                match self {
                    $(Self::$variant { .. } => $sev),*
                }
            }

            fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant { .. } => $kind),*
                }
            }

            fn occurred_at(&self) -> DateTime<Utc> {
                match self {
                    $(Self::$variant { occurred_at, .. } => *occurred_at),*
                }
            }
        }
    };
}

monitoring_event!(MailboxEvent {
    Full { capacity: usize } => "mailbox.full", EventSeverity::Warning;
    Closed {} => "mailbox.closed", EventSeverity::Info;
});

monitoring_event!(ExecutorEvent {
    TaskPanicked { worker: usize } => "executor.task_panicked", EventSeverity::Critical;
    QueueFull { capacity: usize } => "executor.queue_full", EventSeverity::Warning;
});

monitoring_event!(ReactorEvent {
    QueueFull { capacity: usize } => "reactor.queue_full", EventSeverity::Warning;
});

monitoring_event!(BusEvent {
    ConsumerPanicked { address: String } => "bus.consumer_panicked", EventSeverity::Critical;
    DeliveryRejected { address: String } => "bus.delivery_rejected", EventSeverity::Warning;
    RequestTimedOut { address: String } => "bus.request_timed_out", EventSeverity::Warning;
});

monitoring_event!(AdmissionEvent {
    Rejected { reason: String } => "admission.rejected", EventSeverity::Warning;
    Accepted {} => "admission.accepted", EventSeverity::Info;
    HandlerPanicked {} => "admission.handler_panicked", EventSeverity::Critical;
});

monitoring_event!(SupervisionEvent {
    DeploymentRestarted { deployment: String, attempt: u32 } => "supervision.restarted", EventSeverity::Warning;
    DeploymentGaveUp { deployment: String } => "supervision.gave_up", EventSeverity::Critical;
});
