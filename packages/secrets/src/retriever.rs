//! Bounded, retried, aggregated secret retrieval

use crate::env::load_into_env;
use crate::parse::parse_secret_value;
use crate::source::SecretSource;
use crate::types::{MergedSecrets, SecretBundle};
use batchline_batch::{plan, Aggregator, ChunkOutcome, Plan};
use batchline_common::{
    BatchlineError, Config, LoggingTransformer, Result, BATCH_SIZE_LIMIT,
};
use batchline_retry::{RetryExecutor, RetryPolicy};
use futures::stream::{self, StreamExt};
use tracing::debug;

const GET_ONE: &str = "get_secret_value";
const GET_MANY: &str = "batch_get_secret_value";

/// Fetches secrets from a `SecretSource` and merges them into one map
///
/// Ids are sent in batches of at most twenty. Every provider call runs
/// under the retry policy. Batches go out one at a time unless
/// `with_concurrency` raises the limit.
#[derive(Debug, Clone)]
pub struct SecretRetriever<S> {
    source: S,
    executor: RetryExecutor,
    batch_size_limit: usize,
    concurrency: usize,
}

impl<S: SecretSource> SecretRetriever<S> {
    /// Retriever with the default retry policy
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            executor: RetryExecutor::default(),
            batch_size_limit: BATCH_SIZE_LIMIT,
            concurrency: 1,
        }
    }

    /// Retriever tuned by `config`
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation
    pub fn from_config(source: S, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            executor: RetryExecutor::new(RetryPolicy::from_config(config)),
            batch_size_limit: config.batch_size_limit.min(BATCH_SIZE_LIMIT),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = RetryExecutor::new(policy);
        self
    }

    /// Share an executor, and therefore its policy, with other clients
    #[must_use]
    pub fn with_executor(mut self, executor: RetryExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Allow up to `limit` batches in flight at once
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Underlying source
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and merge the bundles of every id
    ///
    /// On key collisions the bundle merged last wins. Batches merge in
    /// completion order, which is request order when concurrency is one.
    ///
    /// # Errors
    /// - `InvalidSecretValue` for the first secret that is not a flat
    ///   string-valued JSON object; the rest of its batch is skipped
    /// - `Aggregate` carrying every per-id rejection, in batch order
    /// - transport errors once retries are exhausted
    pub async fn fetch<I: AsRef<str>>(&self, ids: &[I]) -> Result<MergedSecrets> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_ref().to_owned()).collect();

        match plan(&ids, self.batch_size_limit)? {
            Plan::Empty => Ok(MergedSecrets::new()),
            Plan::Single(id) => self.fetch_single(&id).await,
            Plan::Batches(batches) => self.fetch_batches(ids.len(), batches).await,
        }
    }

    /// Fetch secrets and export them as process environment variables
    ///
    /// Returns the number of variables written.
    ///
    /// # Errors
    /// Everything `fetch` returns, plus `Configuration` for keys that cannot
    /// name an environment variable
    pub async fn load_env<I: AsRef<str>>(&self, ids: &[I], overwrite: bool) -> Result<usize> {
        let secrets = self.fetch(ids).await?;
        load_into_env(&secrets, overwrite)
    }

    async fn fetch_single(&self, id: &str) -> Result<MergedSecrets> {
        let fetched = self
            .executor
            .run(GET_ONE, || self.source.get_one(id))
            .await;

        match fetched {
            Ok(value) => parse_secret_value(&value),
            Err(BatchlineError::Rejected(rejection)) => {
                LoggingTransformer::log_batch_outcome(GET_ONE, 0, 1);
                Err(BatchlineError::aggregate(vec![rejection]))
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_batches(&self, total: usize, batches: Vec<Vec<String>>) -> Result<MergedSecrets> {
        LoggingTransformer::log_batch_plan(GET_MANY, total, batches.len());

        let mut aggregator = Aggregator::<MergedSecrets>::new();
        let mut in_flight = stream::iter(batches)
            .map(|batch| self.fetch_batch(batch))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = in_flight.next().await {
            aggregator.push(outcome?);
        }

        LoggingTransformer::log_batch_outcome(GET_MANY, aggregator.values(), aggregator.errors().len());
        aggregator.finish().map_err(BatchlineError::from)
    }

    async fn fetch_batch(&self, batch: Vec<String>) -> Result<ChunkOutcome<SecretBundle>> {
        let response = self
            .executor
            .run(GET_MANY, || self.source.get_many(&batch))
            .await?;

        debug!(
            requested = batch.len(),
            returned = response.values.len(),
            rejected = response.errors.len(),
            "secret batch received"
        );

        let bundles = response
            .values
            .iter()
            .map(parse_secret_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(ChunkOutcome::new(bundles, response.errors))
    }
}
