//! Messages as they cross the queue boundary

use batchline_codec::Encoding;
use batchline_common::BatchError;
use serde::{Deserialize, Serialize};

/// Transport confirmation that a body was enqueued
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ack {
    /// Identifier assigned by the queue
    pub message_id: String,
}

impl Ack {
    /// Wrap a queue-assigned identifier
    #[must_use]
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}

/// Raw message handed out by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Identifier assigned at enqueue
    pub message_id: String,
    /// Handle for deleting this delivery
    pub receipt: String,
    /// Encoded body
    pub body: Vec<u8>,
}

/// Decoded message
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T = serde_json::Value> {
    /// Identifier assigned at enqueue
    pub message_id: String,
    /// Handle passed to `QueueClient::acknowledge`
    pub receipt: String,
    /// How the body was encoded on the wire
    pub encoding: Encoding,
    /// Decoded payload
    pub value: T,
}

/// Result of enqueueing several bodies in one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEnqueue {
    /// Acknowledgements for accepted bodies
    pub acks: Vec<Ack>,
    /// Per-entry rejections
    pub errors: Vec<BatchError>,
}
