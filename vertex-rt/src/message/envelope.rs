// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::body::Body;
use crate::bus::{Bus, BusError};
use crate::util::{Address, CorrelationId};

/// An immutable message envelope created by the bus on `publish`/`send`/
/// `request` and consumed once by the `Consumer` it is delivered to.
///
/// Headers are copy-on-read: [`Message::headers`] hands back a clone so
/// a handler can never mutate what other (already-dispatched) clones of
/// the same envelope observe.
#[derive(Debug, Clone)]
pub struct Message {
    body: Body,
    headers: HashMap<String, String>,
    reply_address: Option<Address>,
    correlation_id: Option<CorrelationId>,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(body: Body) -> Self {
        Self {
            body,
            headers: HashMap::new(),
            reply_address: None,
            correlation_id: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub(crate) fn with_reply_address(mut self, address: Address) -> Self {
        self.reply_address = Some(address);
        self
    }

    pub(crate) fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Copy-on-read view of the envelope's headers.
    pub fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn reply_address(&self) -> Option<&Address> {
        self.reply_address.as_ref()
    }

    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.correlation_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Reply to this message: equivalent to `bus.send(reply_address,
    /// body)`, preserving this message's correlation id on the reply.
    ///
    /// Returns [`BusError::NoReplyAddress`] if this message was not sent
    /// with a reply address (e.g. it came from `publish`, or from a
    /// plain `send` rather than a `request`).
    pub fn reply(&self, bus: &Bus, body: Body) -> Result<(), BusError> {
        let reply_address = self.reply_address.clone().ok_or(BusError::NoReplyAddress)?;
        let mut reply = Message::new(body);
        if let Some(correlation_id) = self.correlation_id {
            reply = reply.with_correlation_id(correlation_id);
        }
        bus.deliver_prebuilt(&reply_address, reply)
    }
}
