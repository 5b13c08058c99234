//! Merging chunk results into one logical outcome

use batchline_common::{AggregateError, BatchError};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use tracing::debug;

/// What one chunk request produced: accepted values and per-item rejections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome<T> {
    /// Values the provider returned
    pub values: Vec<T>,
    /// Items the provider rejected
    pub errors: Vec<BatchError>,
}

impl<T> ChunkOutcome<T> {
    /// Create an outcome from both halves of a provider response
    #[must_use]
    pub fn new(values: Vec<T>, errors: Vec<BatchError>) -> Self {
        Self { values, errors }
    }

    /// Chunk where every item succeeded
    #[must_use]
    pub fn success(values: Vec<T>) -> Self {
        Self::new(values, Vec::new())
    }

    /// Chunk where items were rejected and nothing was returned
    #[must_use]
    pub fn failure(errors: Vec<BatchError>) -> Self {
        Self::new(Vec::new(), errors)
    }

    /// Whether the provider rejected nothing
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T> From<Result<Vec<T>, Vec<BatchError>>> for ChunkOutcome<T> {
    fn from(result: Result<Vec<T>, Vec<BatchError>>) -> Self {
        match result {
            Ok(values) => Self::success(values),
            Err(errors) => Self::failure(errors),
        }
    }
}

/// Accumulator that successful values are merged into
pub trait Accumulate<T> {
    /// Fold one value in; later values win over earlier ones on conflict
    fn absorb(&mut self, value: T);
}

impl<T> Accumulate<T> for Vec<T> {
    fn absorb(&mut self, value: T) {
        self.push(value);
    }
}

impl<K, V, S> Accumulate<HashMap<K, V, S>> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn absorb(&mut self, value: HashMap<K, V, S>) {
        self.extend(value);
    }
}

impl<K: Ord, V> Accumulate<BTreeMap<K, V>> for BTreeMap<K, V> {
    fn absorb(&mut self, value: BTreeMap<K, V>) {
        self.extend(value);
    }
}

/// Incrementally merges chunk outcomes in completion order
///
/// The accumulator belongs to one in-flight operation. Any rejected item in
/// any chunk fails the whole operation in `finish`, even when other chunks
/// succeeded completely.
#[derive(Debug, Clone)]
pub struct Aggregator<A> {
    merged: A,
    errors: Vec<BatchError>,
    chunks: usize,
    values: usize,
}

impl<A: Default> Default for Aggregator<A> {
    fn default() -> Self {
        Self::with_accumulator(A::default())
    }
}

impl<A> Aggregator<A> {
    /// Create an aggregator around an empty accumulator
    #[must_use]
    pub fn new() -> Self
    where
        A: Default,
    {
        Self::default()
    }

    /// Create an aggregator around an existing accumulator
    #[must_use]
    pub fn with_accumulator(merged: A) -> Self {
        Self {
            merged,
            errors: Vec::new(),
            chunks: 0,
            values: 0,
        }
    }

    /// Merge one chunk's outcome
    pub fn push<T>(&mut self, outcome: ChunkOutcome<T>)
    where
        A: Accumulate<T>,
    {
        self.chunks += 1;
        self.values += outcome.values.len();
        for value in outcome.values {
            self.merged.absorb(value);
        }
        if !outcome.errors.is_empty() {
            debug!(
                chunk = self.chunks,
                rejected = outcome.errors.len(),
                "chunk returned item errors"
            );
        }
        self.errors.extend(outcome.errors);
    }

    /// Chunks merged so far
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Successful values merged so far
    #[must_use]
    pub fn values(&self) -> usize {
        self.values
    }

    /// Rejections collected so far, in arrival order
    #[must_use]
    pub fn errors(&self) -> &[BatchError] {
        &self.errors
    }

    /// Finish aggregation
    ///
    /// # Errors
    /// Returns every collected rejection if there was at least one
    pub fn finish(self) -> Result<A, AggregateError> {
        if self.errors.is_empty() {
            Ok(self.merged)
        } else {
            Err(AggregateError::new(self.errors))
        }
    }
}

/// Merge every chunk outcome in iteration order
///
/// # Errors
/// Returns an `AggregateError` listing every rejection across all chunks
pub fn aggregate<A, T, I>(outcomes: I) -> Result<A, AggregateError>
where
    A: Default + Accumulate<T>,
    I: IntoIterator<Item = ChunkOutcome<T>>,
{
    let mut aggregator = Aggregator::<A>::new();
    for outcome in outcomes {
        aggregator.push(outcome);
    }
    aggregator.finish()
}
