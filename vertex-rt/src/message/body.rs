// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::Serialize;

/// A message body is either already a byte sequence, or a value the bus
/// encodes (JSON, by default) the first time it is sent.
#[derive(Debug, Clone)]
pub enum Body {
    /// Pre-encoded bytes, passed through verbatim.
    Bytes(Vec<u8>),
}

/// Failure encoding or decoding a [`Body`].
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("failed to encode body as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Body {
    /// Wrap already-encoded bytes.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Encode a serializable value as JSON (the bus's default body codec).
    pub fn encode(value: &impl Serialize) -> Result<Self, BodyError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::Bytes(bytes))
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Decode the body as JSON into `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, BodyError> {
        Ok(serde_json::from_slice(self.as_bytes())?)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Bytes(value.into_bytes())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        n: u32,
    }

    #[test]
    fn round_trips_through_json() {
        let body = Body::encode(&Ping { n: 7 }).unwrap();
        let decoded: Ping = body.decode().unwrap();
        assert_eq!(decoded, Ping { n: 7 });
    }

    #[test]
    fn bytes_pass_through_verbatim() {
        let body = Body::from("hello");
        assert_eq!(body.as_bytes(), b"hello");
    }
}
