//! A bounded, thread-safe FIFO of opaque values with non-blocking send and
//! cancelable receive.
//!
//! `Mailbox<T>` is the leaf primitive everything else in this crate is
//! built from: the `Reactor`'s callback queue, the `Executor`'s task queue,
//! every `Consumer`'s inbox, and the admission layer's request queue are
//! all `Mailbox<T>` for a different `T`.

mod bounded;
mod metrics;
mod traits;

pub use bounded::{Mailbox, MailboxSender};
pub use metrics::MailboxMetrics;
pub use traits::{MailboxError, RecvOutcome};
