//! Retry executor for remote operations

use crate::policy::RetryPolicy;
use batchline_common::BatchlineError;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Classifies a failure as worth repeating or not
pub trait Retryable {
    /// Whether the same request may succeed if sent again
    fn is_transient(&self) -> bool;
}

impl Retryable for BatchlineError {
    fn is_transient(&self) -> bool {
        BatchlineError::is_transient(self)
    }
}

/// Runs fallible remote operations under a shared `RetryPolicy`
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: Arc<RetryPolicy>,
}

impl RetryExecutor {
    /// Create an executor owning `policy`
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Create an executor sharing an existing policy
    #[must_use]
    pub fn shared(policy: Arc<RetryPolicy>) -> Self {
        Self { policy }
    }

    /// Policy applied to every call
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails terminally, or the policy's
    /// attempts are used up. `label` names the operation in log lines.
    ///
    /// # Errors
    /// Returns the first terminal error, or the last transient error once
    /// every attempt failed
    pub async fn run<F, Fut, T, E>(&self, label: &str, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        run_with_policy(&self.policy, label, operation).await
    }
}

/// Run `operation` under `policy`
///
/// # Errors
/// Returns the first terminal error, or the last transient error once every
/// attempt failed
pub async fn execute<F, Fut, T, E>(operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    run_with_policy(policy, "operation", operation).await
}

async fn run_with_policy<F, Fut, T, E>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    debug!(operation = label, attempts, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_transient() {
                    warn!(operation = label, error = %err, "non-retryable error encountered");
                    return Err(err);
                }

                if attempts >= policy.max_attempts() {
                    error!(
                        operation = label,
                        max_attempts = policy.max_attempts(),
                        error = %err,
                        "max retry attempts exceeded"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempts);
                debug!(
                    operation = label,
                    attempt = attempts + 1,
                    max_attempts = policy.max_attempts(),
                    delay = ?delay,
                    error = %err,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
