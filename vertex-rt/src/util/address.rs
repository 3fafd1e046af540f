// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length, in bytes, of an [`Address`].
pub const MAX_ADDRESS_LEN: usize = 255;

/// Prefix reserved for auto-generated reply addresses (`reply.<uuid>`).
pub const REPLY_PREFIX: &str = "reply.";

/// A bus address: a non-empty, length-bounded, opaque string compared by
/// exact byte equality.
///
/// Construction always validates against [`AddressError`] — there is no
/// way to hold an invalid `Address` once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

/// Errors that can arise from validating or constructing an [`Address`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must not be empty")]
    Empty,
    #[error("address length {len} exceeds the {MAX_ADDRESS_LEN}-byte limit")]
    TooLong { len: usize },
}

impl Address {
    /// Validate and wrap an application-defined address.
    pub fn new(value: impl Into<String>) -> Result<Self, AddressError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AddressError::Empty);
        }
        if value.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong { len: value.len() });
        }
        Ok(Self(value))
    }

    /// Mint a fresh, unique reply address: `reply.<uuid>`.
    pub fn new_reply() -> Self {
        Self(format!("{REPLY_PREFIX}{}", Uuid::new_v4()))
    }

    /// True if this address is a reply address (`reply.<uuid>` shape).
    pub fn is_reply(&self) -> bool {
        self.0.starts_with(REPLY_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_address_is_rejected() {
        assert_eq!(Address::new(""), Err(AddressError::Empty));
    }

    #[test]
    fn address_at_the_limit_is_accepted() {
        let value = "a".repeat(MAX_ADDRESS_LEN);
        assert!(Address::new(value).is_ok());
    }

    #[test]
    fn address_over_the_limit_is_rejected() {
        let value = "a".repeat(MAX_ADDRESS_LEN + 1);
        assert_eq!(
            Address::new(value),
            Err(AddressError::TooLong {
                len: MAX_ADDRESS_LEN + 1
            })
        );
    }

    #[test]
    fn reply_addresses_are_recognized() {
        let addr = Address::new_reply();
        assert!(addr.is_reply());
        assert!(addr.as_str().starts_with("reply."));
    }

    #[test]
    fn ordinary_addresses_are_not_reply_addresses() {
        let addr = Address::new("svc.echo").unwrap();
        assert!(!addr.is_reply());
    }

    #[test]
    fn equality_is_exact_byte_comparison() {
        let a = Address::new("svc.echo").unwrap();
        let b = Address::new("svc.echo").unwrap();
        let c = Address::new("svc.Echo").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
