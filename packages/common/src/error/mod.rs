//! Error handling for every pipeline
//!
//! One closed taxonomy is shared by the codec, the retry executor and both
//! pipelines so callers pattern-match on a single enum:
//! - Transport failures tagged transient or terminal
//! - Payload size and integrity failures
//! - Secret validation failures
//! - Aggregated per-item provider failures

pub mod constructors;
pub mod types;

pub use types::{AggregateError, BatchError, BatchlineError, ErrorKind, Result};
