//! Secret source boundary types

use batchline_common::BatchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key/value pairs decoded from one secret
pub type SecretBundle = HashMap<String, String>;

/// Union of every bundle fetched by one retrieval
pub type MergedSecrets = HashMap<String, String>;

/// One secret as stored by the provider
///
/// Exactly one of `secret_string` and `secret_binary` is normally set;
/// `secret_binary` holds base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretValue {
    /// Provider identifier, reported in validation errors
    #[serde(rename = "ARN")]
    pub arn: String,
    /// Friendly name, if the provider returned one
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Text payload
    #[serde(rename = "SecretString", default, skip_serializing_if = "Option::is_none")]
    pub secret_string: Option<String>,
    /// Base64 encoded binary payload
    #[serde(rename = "SecretBinary", default, skip_serializing_if = "Option::is_none")]
    pub secret_binary: Option<String>,
}

impl SecretValue {
    /// Secret stored as text
    #[must_use]
    pub fn string(arn: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            name: None,
            secret_string: Some(value.into()),
            secret_binary: None,
        }
    }

    /// Secret stored as binary, given as base64 text
    #[must_use]
    pub fn binary(arn: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            name: None,
            secret_string: None,
            secret_binary: Some(base64.into()),
        }
    }

    /// Attach a friendly name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Response of one bulk fetch: values found and ids the provider rejected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGetResponse {
    /// Secrets returned
    #[serde(rename = "SecretValues", default)]
    pub values: Vec<SecretValue>,
    /// Per-id rejections
    #[serde(rename = "Errors", default)]
    pub errors: Vec<BatchError>,
}

impl BatchGetResponse {
    /// Build a response from both halves
    #[must_use]
    pub fn new(values: Vec<SecretValue>, errors: Vec<BatchError>) -> Self {
        Self { values, errors }
    }
}
