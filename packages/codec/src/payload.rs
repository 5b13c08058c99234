//! Encoded payload type with encoding metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a payload was transformed after JSON serialization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 JSON text
    #[default]
    Plain,
    /// Gzip-compressed JSON, base64 encoded
    Compressed,
}

impl Encoding {
    /// Map the caller's compression flag to an encoding
    #[must_use]
    pub fn from_flag(compress: bool) -> Self {
        if compress {
            Self::Compressed
        } else {
            Self::Plain
        }
    }

    /// Whether the payload went through gzip + base64
    #[must_use]
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Plain => f.write_str("plain"),
            Encoding::Compressed => f.write_str("compressed"),
        }
    }
}

/// Bytes ready for transmission, already checked against the size ceiling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
    encoding: Encoding,
    original_size: usize,
}

impl EncodedPayload {
    pub(crate) fn new(bytes: Vec<u8>, encoding: Encoding, original_size: usize) -> Self {
        Self {
            bytes,
            encoding,
            original_size,
        }
    }

    /// Get the wire bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to the wire bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Wire size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encoding applied after serialization
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Size of the serialized JSON before compression
    #[must_use]
    pub fn original_size(&self) -> usize {
        self.original_size
    }
}

impl AsRef<[u8]> for EncodedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<EncodedPayload> for Vec<u8> {
    fn from(payload: EncodedPayload) -> Self {
        payload.bytes
    }
}
