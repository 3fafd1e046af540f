//! Top-level error type aggregating every subsystem's own error enum.

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::admission::AdmissionError;
use crate::bus::BusError;
use crate::component::ComponentError;
use crate::config::ConfigError;

/// Runtime-wide error returned by the `Component`/`Deployment` layer,
/// wrapping whichever subsystem's error actually occurred.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("component error: {0}")]
    Component(#[from] ComponentError),

    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error("admission error: {0}")]
    Admission(#[from] AdmissionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Whether retrying the same operation might succeed without any
    /// other state changing — backpressure and a full mailbox, but not a
    /// missing deployment or a bad config value.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Admission(AdmissionError::CapacityExhausted { .. } | AdmissionError::QueueFull { .. })
                | Self::Bus(BusError::Timeout)
        )
    }

    /// Whether the runtime itself is shutting down rather than this one
    /// operation having failed on its own terms.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Bus(BusError::Closed) | Self::Admission(AdmissionError::Closed))
    }
}
