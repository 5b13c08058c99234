//! JSON codec with optional gzip + base64 and a pre-transmission size check

use crate::gzip;
use crate::payload::{EncodedPayload, Encoding};
use base64::{engine::general_purpose, Engine as _};
use batchline_common::{
    BatchlineError, Config, Result, DEFAULT_COMPRESSION_LEVEL, MAX_PAYLOAD_BYTES,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Codec limits and compression settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Largest encoded payload accepted, in bytes
    pub max_payload_bytes: usize,
    /// Gzip level, 0-9
    pub compression_level: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CodecConfig {
    /// Derive codec settings from the shared configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            compression_level: config.compression_level,
        }
    }
}

/// Serializes values for a size-constrained, text-only transport
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Create a codec with the given settings
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Current settings
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serialize `value` to JSON, optionally gzip + base64 it, then enforce the
    /// size ceiling on the final bytes.
    ///
    /// # Errors
    /// - `PayloadTooLarge` if the final bytes exceed `max_payload_bytes`
    /// - `PayloadDecode` if the value cannot be serialized
    pub fn encode<T>(&self, value: &T, compress: bool) -> Result<EncodedPayload>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value)
            .map_err(|e| BatchlineError::decode(format!("value is not JSON serializable: {e}")))?;
        let original_size = json.len();
        let encoding = Encoding::from_flag(compress);

        let bytes = match encoding {
            Encoding::Plain => json,
            Encoding::Compressed => {
                let compressed = gzip::compress(&json, self.config.compression_level)?;
                general_purpose::STANDARD.encode(compressed).into_bytes()
            }
        };

        self.check_size(bytes.len())?;
        debug!(
            encoding = %encoding,
            original_size,
            encoded_size = bytes.len(),
            "payload encoded"
        );
        Ok(EncodedPayload::new(bytes, encoding, original_size))
    }

    /// Reverse `encode`: base64 decode and gunzip when `compressed`, then
    /// deserialize.
    ///
    /// # Errors
    /// Returns `PayloadDecode` for invalid base64, a corrupt gzip stream or
    /// JSON that does not match `T`
    pub fn decode<T>(&self, bytes: &[u8], compressed: bool) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if compressed {
            let raw = general_purpose::STANDARD
                .decode(trim_ascii(bytes))
                .map_err(|e| BatchlineError::decode(format!("invalid base64 payload: {e}")))?;
            let json = gzip::decompress(&raw)?;
            from_json(&json)
        } else {
            from_json(bytes)
        }
    }

    /// Fail with `PayloadTooLarge` if `size` exceeds the ceiling
    ///
    /// # Errors
    /// Returns `PayloadTooLarge` carrying the actual size
    pub fn check_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_payload_bytes {
            return Err(BatchlineError::too_large(
                size,
                self.config.max_payload_bytes,
            ));
        }
        Ok(())
    }
}

/// Encode with the default codec settings
///
/// # Errors
/// See [`Codec::encode`]
pub fn encode<T>(value: &T, compress: bool) -> Result<EncodedPayload>
where
    T: Serialize + ?Sized,
{
    Codec::default().encode(value, compress)
}

/// Decode with the default codec settings
///
/// # Errors
/// See [`Codec::decode`]
pub fn decode<T>(bytes: &[u8], compressed: bool) -> Result<T>
where
    T: DeserializeOwned,
{
    Codec::default().decode(bytes, compressed)
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| BatchlineError::decode(format!("invalid JSON payload: {e}")))
}

// Transports sometimes append a trailing newline to text bodies
fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
