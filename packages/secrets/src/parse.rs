//! Decoding and validating stored secret values

use crate::types::{SecretBundle, SecretValue};
use base64::{engine::general_purpose, Engine as _};
use batchline_common::{BatchlineError, Result};
use serde_json::Value;

/// Decode one secret into its key/value bundle
///
/// The stored text (or base64-decoded binary) must be a JSON object whose
/// values are all strings.
///
/// # Errors
/// Returns `InvalidSecretValue` naming the secret for any other shape
pub fn parse_secret_value(value: &SecretValue) -> Result<SecretBundle> {
    let invalid = || BatchlineError::invalid_secret(value.arn.clone());

    let data: Vec<u8> = match (&value.secret_string, &value.secret_binary) {
        (Some(text), _) => text.clone().into_bytes(),
        (None, Some(encoded)) => general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| invalid())?,
        (None, None) => return Err(invalid()),
    };

    let parsed: Value = serde_json::from_slice(&data).map_err(|_| invalid())?;
    let Value::Object(fields) = parsed else {
        return Err(invalid());
    };

    fields
        .into_iter()
        .map(|(key, field)| match field {
            Value::String(text) => Ok((key, text)),
            _ => Err(invalid()),
        })
        .collect()
}
