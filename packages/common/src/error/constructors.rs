//! Error constructors and classification helpers

use super::types::{AggregateError, BatchError, BatchlineError, ErrorKind};
use std::fmt;

impl BatchlineError {
    /// Create a `TransportTransient` error with a formatted message
    #[must_use]
    pub fn transient(msg: impl fmt::Display) -> Self {
        Self::TransportTransient(msg.to_string())
    }

    /// Create a `TransportTerminal` error with a formatted message
    #[must_use]
    pub fn terminal(msg: impl fmt::Display) -> Self {
        Self::TransportTerminal(msg.to_string())
    }

    /// Create a `PayloadTooLarge` error
    #[must_use]
    pub fn too_large(size: usize, limit: usize) -> Self {
        Self::PayloadTooLarge { size, limit }
    }

    /// Create a `PayloadDecode` error with a formatted message
    #[must_use]
    pub fn decode(msg: impl fmt::Display) -> Self {
        Self::PayloadDecode(msg.to_string())
    }

    /// Create an `UndecodableMessage` error for one delivery
    #[must_use]
    pub fn undecodable(
        message_id: impl Into<String>,
        receipt: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::UndecodableMessage {
            message_id: message_id.into(),
            receipt: receipt.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an `InvalidSecretValue` error for the given secret
    #[must_use]
    pub fn invalid_secret(secret_id: impl Into<String>) -> Self {
        Self::InvalidSecretValue {
            secret_id: secret_id.into(),
        }
    }

    /// Create a `Rejected` error for one work item
    #[must_use]
    pub fn rejected(
        id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected(BatchError::new(id, code, message))
    }

    /// Create an `Aggregate` error from collected failures
    #[must_use]
    pub fn aggregate(errors: Vec<BatchError>) -> Self {
        Self::Aggregate(AggregateError::new(errors))
    }

    /// Create a `Configuration` error with a formatted message
    #[must_use]
    pub fn configuration(msg: impl fmt::Display) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Get the error kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransportTransient(_) => ErrorKind::TransportTransient,
            Self::TransportTerminal(_) => ErrorKind::TransportTerminal,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::PayloadDecode(_) => ErrorKind::PayloadDecode,
            Self::UndecodableMessage { .. } => ErrorKind::UndecodableMessage,
            Self::InvalidSecretValue { .. } => ErrorKind::InvalidSecretValue,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::Aggregate(_) => ErrorKind::Aggregate,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the transport reported a closed or reset connection.
    ///
    /// Only these failures are worth repeating; payload, validation and
    /// provider errors produce the same outcome on every attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportTransient(_))
    }
}

impl From<BatchError> for BatchlineError {
    fn from(error: BatchError) -> Self {
        Self::Rejected(error)
    }
}

impl From<std::io::Error> for BatchlineError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind as Io;

        match error.kind() {
            Io::ConnectionReset
            | Io::ConnectionAborted
            | Io::BrokenPipe
            | Io::UnexpectedEof => Self::transient(error),
            _ => Self::terminal(error),
        }
    }
}
