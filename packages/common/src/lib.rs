//! Common infrastructure for the batchline workspace
//!
//! This crate provides the pieces every pipeline shares:
//! - The closed error taxonomy (`BatchlineError`) and per-item `BatchError`s
//! - Explicit configuration (`Config`) with provider ceilings as constants
//! - `env_logger` based logging initialization for binaries and tests

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    Config, BATCH_SIZE_LIMIT, DEFAULT_BACKOFF_FACTOR, DEFAULT_BACKOFF_INITIAL_MS,
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_RETRY_ATTEMPTS, MAX_PAYLOAD_BYTES, QUEUE_BATCH_LIMIT,
};
pub use error::{AggregateError, BatchError, BatchlineError, ErrorKind, Result};
pub use logging::LoggingTransformer;
