//! A single-threaded, strictly ordered event loop.
//!
//! `Reactor` is an [`crate::executor::Executor`] pinned to one worker: it
//! guarantees its callbacks run one at a time, in submission order, and
//! never concurrently with each other. Components that need "runs later,
//! but never interleaved with itself" semantics — a deployment's lifecycle
//! hooks, a single-writer log — schedule onto a `Reactor` rather than an
//! `Executor`.

mod core;
mod error;

pub use core::{Callback, Reactor};
pub use error::ReactorError;
