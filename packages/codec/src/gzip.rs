//! Gzip framing for compressed payloads

use batchline_common::{BatchlineError, Result};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Gzip `data` at `level`, clamped to 0-9
///
/// # Errors
/// Returns `PayloadDecode` if the encoder fails
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let level = Compression::new(level.min(9));
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder
        .write_all(data)
        .map_err(|e| BatchlineError::decode(format!("gzip encoder failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| BatchlineError::decode(format!("gzip encoder failed: {e}")))
}

/// Inflate exactly one gzip member
///
/// # Errors
/// Returns `PayloadDecode` for a corrupt or truncated stream, or for bytes
/// left over after the member
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut inflated = Vec::with_capacity(data.len().saturating_mul(2));
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| BatchlineError::decode(format!("corrupt gzip stream: {e}")))?;

    let trailing = decoder.into_inner().len();
    if trailing > 0 {
        return Err(BatchlineError::decode(format!(
            "{trailing} unexpected byte(s) after the gzip stream"
        )));
    }
    Ok(inflated)
}
