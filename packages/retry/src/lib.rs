//! Bounded retry with geometric backoff
//!
//! Only transient transport failures (closed or reset connections) are
//! retried. Everything else propagates on the first attempt, and an exhausted
//! call returns the original transient error rather than a synthetic one.

pub mod executor;
pub mod policy;

pub use executor::{execute, RetryExecutor, Retryable};
pub use policy::{Backoff, RetryPolicy};
