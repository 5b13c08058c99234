//! Payload codec for size-constrained transports
//!
//! Values are serialized to JSON; when compression is requested the JSON is
//! gzipped and base64 encoded so it survives text-only transports. The size
//! ceiling is checked on the final bytes, before anything is transmitted.

pub mod codec;
pub mod gzip;
pub mod payload;

pub use codec::{decode, encode, Codec, CodecConfig};
pub use payload::{EncodedPayload, Encoding};
