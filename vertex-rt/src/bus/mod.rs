//! The in-process bus: publish/subscribe fan-out, point-to-point
//! delivery, and request/reply — all addressed by opaque [`Address`](crate::util::Address)
//! strings rather than typed actor references.

mod consumer;
mod core;
mod error;
mod registry;

pub use consumer::{Consumer, ConsumerHandle, Handler};
pub use core::{Bus, BusConfig, MAX_REQUEST_TIMEOUT};
pub use error::BusError;
