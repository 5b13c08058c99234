//! Core error types and definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using `BatchlineError`
pub type Result<T> = std::result::Result<T, BatchlineError>;

/// Main error type for all batchline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchlineError {
    /// Connection dropped or reset by the transport
    #[error("Transient transport failure: {0}")]
    TransportTransient(String),

    /// Any other transport level rejection
    #[error("Transport failure: {0}")]
    TransportTerminal(String),

    /// Encoded payload exceeds the size ceiling
    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// Ceiling the payload was checked against
        limit: usize,
    },

    /// Payload could not be serialized, or a received payload is corrupt
    #[error("Payload decode failed: {0}")]
    PayloadDecode(String),

    /// A dequeued message body could not be decoded
    #[error("Message {message_id} could not be decoded: {reason}")]
    UndecodableMessage {
        /// Identifier assigned at enqueue
        message_id: String,
        /// Receipt for deleting or dead-lettering the delivery
        receipt: String,
        /// Codec failure
        reason: String,
    },

    /// Secret value is not a flat JSON object of strings
    #[error(
        "Invalid secret value: secret {secret_id} contains a value that is not a string or is not a valid json object"
    )]
    InvalidSecretValue {
        /// Identifier of the offending secret
        secret_id: String,
    },

    /// Provider rejected a single work item
    #[error("Provider rejected {0}")]
    Rejected(BatchError),

    /// One or more work items failed across a batched operation
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Invalid configuration or missing environment input
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Discriminant of `BatchlineError` without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See `BatchlineError::TransportTransient`
    TransportTransient,
    /// See `BatchlineError::TransportTerminal`
    TransportTerminal,
    /// See `BatchlineError::PayloadTooLarge`
    PayloadTooLarge,
    /// See `BatchlineError::PayloadDecode`
    PayloadDecode,
    /// See `BatchlineError::UndecodableMessage`
    UndecodableMessage,
    /// See `BatchlineError::InvalidSecretValue`
    InvalidSecretValue,
    /// See `BatchlineError::Rejected`
    Rejected,
    /// See `BatchlineError::Aggregate`
    Aggregate,
    /// See `BatchlineError::Configuration`
    Configuration,
}

/// Why one work item's sub-request failed at the provider level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchError {
    /// Identifier of the failed work item
    #[serde(rename = "SecretId", alias = "Id")]
    pub id: String,
    /// Provider error code
    #[serde(rename = "ErrorCode")]
    pub code: String,
    /// Provider error message
    #[serde(rename = "Message")]
    pub message: String,
}

impl BatchError {
    /// Create a new per-item failure
    #[must_use]
    pub fn new(id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.id, self.code, self.message)
    }
}

/// Every per-item failure collected across all chunks of one operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateError {
    errors: Vec<BatchError>,
}

impl AggregateError {
    /// Wrap the collected failures
    #[must_use]
    pub fn new(errors: Vec<BatchError>) -> Self {
        Self { errors }
    }

    /// Failures in the order they were collected
    #[must_use]
    pub fn errors(&self) -> &[BatchError] {
        &self.errors
    }

    /// Take ownership of the collected failures
    #[must_use]
    pub fn into_errors(self) -> Vec<BatchError> {
        self.errors
    }

    /// Number of failed work items
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no failures were collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Identifiers of the failed work items
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.id.as_str())
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch request errors ({}): ", self.errors.len())?;
        match serde_json::to_string(&self.errors) {
            Ok(json) => f.write_str(&json),
            Err(_) => {
                let joined = self
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                f.write_str(&joined)
            }
        }
    }
}

impl std::error::Error for AggregateError {}
