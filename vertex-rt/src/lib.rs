//! A reactive application runtime: bounded mailboxes, a serialized
//! event loop and a worker-pool executor built on top of them, an
//! in-process publish/subscribe and request/reply bus, and an
//! admission-controlled front end for whatever HTTP library a
//! deployment chooses to run.
//!
//! The primitives compose bottom-up:
//!
//! - [`mailbox`] — the bounded FIFO every queue in this crate is built
//!   from.
//! - [`executor`] and [`reactor`] — a fixed worker pool, and a
//!   single-worker specialization of it with strict ordering.
//! - [`message`] and [`bus`] — the envelope the bus routes, and the
//!   bus itself: publish, send, request/reply.
//! - [`component`] — deployable units of application logic and the
//!   registry tracking which are running.
//! - [`admission`] — HTTP-agnostic backpressure in front of a
//!   deployment's request handling.
//! - [`supervisor`] — restart policy and failure propagation across a
//!   set of deployments.
//! - [`config`] and [`monitoring`] — the ambient configuration and
//!   typed-event observability layers the rest of the crate is built
//!   against.

pub mod admission;
pub mod bus;
pub mod component;
pub mod config;
mod error;
pub mod executor;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod reactor;
pub mod supervisor;
pub mod util;

pub use admission::{AdmissionConfig, AdmissionError, AdmissionLayer};
pub use bus::{Bus, BusConfig, BusError, Consumer, ConsumerHandle, Handler, MAX_REQUEST_TIMEOUT};
pub use component::{
    AsyncComponent, Component, ComponentError, Context, Deployment, DeploymentRegistry, DeploymentState,
};
pub use config::{ConfigError, ConfigMap, ConfigValue};
pub use error::RuntimeError;
pub use executor::{Executor, ExecutorError};
pub use mailbox::{Mailbox, MailboxError, MailboxMetrics, MailboxSender, RecvOutcome};
pub use message::{Body, BodyError, Message};
pub use reactor::{Reactor, ReactorError};
pub use supervisor::{BackoffStrategy, RestartPolicy, SupervisionStrategy, Supervisor, SupervisorError};
pub use util::{Address, AddressError, CorrelationId, DeploymentId};
