use std::time::Duration;

use crate::mailbox::MailboxError;
use crate::util::AddressError;

/// Errors surfaced by [`crate::bus::Bus`] operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// `send`/`request` targeted an address with no registered consumer.
    #[error("no consumer registered at address {address}")]
    NoConsumer { address: String },

    /// A `request` timeout was non-positive or exceeded the implementation
    /// cap ([`crate::bus::MAX_REQUEST_TIMEOUT`]).
    #[error("invalid request timeout: {timeout:?}")]
    InvalidTimeout { timeout: Duration },

    /// A consumer's inbox rejected the message.
    #[error("delivery failed: {0}")]
    Delivery(#[from] MailboxError),

    /// The address supplied by the caller failed validation.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// A `request` did not receive a reply before its timeout elapsed.
    #[error("request timed out waiting for a reply")]
    Timeout,

    /// The ephemeral reply consumer's channel was dropped before a reply
    /// arrived, without the deadline elapsing.
    #[error("reply channel closed before a reply was delivered")]
    ReplyChannelClosed,

    /// The bus has been shut down and no longer accepts operations.
    #[error("bus is closed")]
    Closed,

    /// [`crate::message::Message::reply`] was called on a message with
    /// no reply address.
    #[error("message has no reply address")]
    NoReplyAddress,
}
