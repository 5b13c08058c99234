//! # Batchline - Bounded Batch & Resilient Delivery
//!
//! Batched secret retrieval and size-checked queue delivery over unreliable
//! transports, with feature-gated components.
//!
//! ## Features
//!
//! ### Building blocks
//! - `codec` - JSON payload codec with optional gzip + base64 and a 256 KiB ceiling
//! - `retry` - retry executor with geometric backoff
//! - `batch` - partitioning and result aggregation
//!
//! ### Pipelines
//! - `secrets` - merged key/value secret retrieval (enables `batch`, `retry`)
//! - `queue` - JSON message delivery (enables `batch`, `codec`, `retry`)
//!
//! `full` enables everything and is the default.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! batchline = { version = "0.1", default-features = false, features = ["queue"] }
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use batchline::{Batchline, MemoryQueue, StaticSecretSource};
//!
//! async fn example() -> batchline::Result<()> {
//!     let batchline = Batchline::from_env()?;
//!
//!     let secrets = batchline
//!         .secrets(StaticSecretSource::new().with_secret("db", r#"{"host":"localhost"}"#))?
//!         .fetch(&["db"])
//!         .await?;
//!
//!     let queue = batchline.queue(MemoryQueue::new())?;
//!     queue.send(&secrets, true).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod master;

pub use master::Batchline;

// === Shared errors, configuration and logging ===
pub use batchline_common::*;

#[cfg(feature = "codec")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec")))]
pub use batchline_codec::{Codec, CodecConfig, EncodedPayload, Encoding};

#[cfg(feature = "retry")]
#[cfg_attr(docsrs, doc(cfg(feature = "retry")))]
pub use batchline_retry::{execute, Backoff, RetryExecutor, RetryPolicy, Retryable};

#[cfg(feature = "batch")]
#[cfg_attr(docsrs, doc(cfg(feature = "batch")))]
pub use batchline_batch::{aggregate, partition, plan, Accumulate, Aggregator, ChunkOutcome, Plan};

#[cfg(feature = "secrets")]
#[cfg_attr(docsrs, doc(cfg(feature = "secrets")))]
pub use batchline_secrets::{
    load_into_env, secret_ids_from_env, BatchGetResponse, MergedSecrets, SecretBundle,
    SecretRetriever, SecretSource, SecretValue, StaticSecretSource,
};

#[cfg(feature = "queue")]
#[cfg_attr(docsrs, doc(cfg(feature = "queue")))]
pub use batchline_queue::{Ack, BatchEnqueue, Envelope, MemoryQueue, Message, QueueClient, QueueTransport};

/// Component crates, for items not re-exported at the root
pub mod components {
    #[cfg(feature = "batch")]
    pub use batchline_batch as batch;
    #[cfg(feature = "codec")]
    pub use batchline_codec as codec;
    pub use batchline_common as common;
    #[cfg(feature = "queue")]
    pub use batchline_queue as queue;
    #[cfg(feature = "retry")]
    pub use batchline_retry as retry;
    #[cfg(feature = "secrets")]
    pub use batchline_secrets as secrets;
}
