// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use rand::Rng;

/// Whether a child is restarted after it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart — a failure is left as `Failed`.
    Never,
    /// Restart on abnormal exit only; a clean `undeploy` is left stopped.
    Transient,
    /// Always restart, whether the child exited cleanly or not.
    Permanent,
}

impl RestartPolicy {
    pub(crate) fn should_restart(&self, abnormal_exit: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Transient => abnormal_exit,
            Self::Permanent => true,
        }
    }
}

/// How long to wait before each successive restart attempt.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    Fixed(Duration),
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Delay before the `attempt`-th restart (1-indexed).
    pub(crate) fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let scaled = initial.as_secs_f64() * multiplier.powi(attempt.saturating_sub(1) as i32);
                Duration::from_secs_f64(scaled.min(max.as_secs_f64()))
            }
        }
    }

    /// `delay` with up to 20% random jitter added, to keep a batch of
    /// children that fail together from hammering the registry with
    /// simultaneous restart attempts.
    pub(crate) fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.delay(attempt);
        let jitter_factor = rand::thread_rng().gen_range(0.0..0.2);
        base + Duration::from_secs_f64(base.as_secs_f64() * jitter_factor)
    }
}
