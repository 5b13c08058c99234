//! Queue delivery pipeline
//!
//! `QueueClient` sends JSON values through a `QueueTransport`. Payloads are
//! encoded (optionally gzip + base64) and checked against the 256 KiB
//! ceiling before any network call; transport calls are retried under one
//! shared policy. `MemoryQueue` is an in-process transport.
//!
//! ```no_run
//! use batchline_queue::{MemoryQueue, QueueClient};
//! use serde_json::json;
//!
//! # async fn demo() -> batchline_common::Result<()> {
//! let client = QueueClient::new(MemoryQueue::new());
//! client.send(&json!({"event": "created"}), false).await?;
//!
//! for message in client.receive::<serde_json::Value>(10).await? {
//!     client.acknowledge(&message).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod memory;
pub mod transport;
pub mod types;

pub use client::QueueClient;
pub use memory::MemoryQueue;
pub use transport::QueueTransport;
pub use types::{Ack, BatchEnqueue, Envelope, Message};
