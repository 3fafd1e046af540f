//! The immutable message envelope routed by the [`crate::bus::Bus`].

mod body;
mod envelope;

pub use body::{Body, BodyError};
pub use envelope::Message;
