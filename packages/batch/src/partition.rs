//! Splitting work items into provider-sized batches

use batchline_common::{BatchlineError, Result};

/// How a sequence of work items will be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<T> {
    /// Nothing to send
    Empty,
    /// Exactly one item: use the provider's single-item request
    Single(T),
    /// Ordered, non-empty batches each no longer than the limit
    Batches(Vec<Vec<T>>),
}

impl<T> Plan<T> {
    /// Number of provider requests this plan issues
    #[must_use]
    pub fn requests(&self) -> usize {
        match self {
            Plan::Empty => 0,
            Plan::Single(_) => 1,
            Plan::Batches(batches) => batches.len(),
        }
    }
}

/// Split `items` into consecutive windows of at most `limit`, in order
///
/// Empty input yields no batches; the last batch may be shorter.
///
/// # Errors
/// Returns `Configuration` if `limit` is zero
pub fn partition<T: Clone>(items: &[T], limit: usize) -> Result<Vec<Vec<T>>> {
    check_limit(limit)?;
    Ok(items.chunks(limit).map(<[T]>::to_vec).collect())
}

/// Choose between the single-item fast path and batched requests
///
/// A lone item skips the batch protocol entirely.
///
/// # Errors
/// Returns `Configuration` if `limit` is zero
pub fn plan<T: Clone>(items: &[T], limit: usize) -> Result<Plan<T>> {
    check_limit(limit)?;
    match items {
        [] => Ok(Plan::Empty),
        [only] => Ok(Plan::Single(only.clone())),
        _ => partition(items, limit).map(Plan::Batches),
    }
}

fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(BatchlineError::configuration(
            "batch size limit must be at least 1",
        ));
    }
    Ok(())
}
