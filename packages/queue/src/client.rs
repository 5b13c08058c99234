//! Queue client: encode, size check, retry, aggregate

use crate::transport::QueueTransport;
use crate::types::{Ack, Message};
use batchline_batch::{plan, Aggregator, ChunkOutcome, Plan};
use batchline_codec::{Codec, CodecConfig, EncodedPayload, Encoding};
use batchline_common::{BatchlineError, Config, LoggingTransformer, Result, QUEUE_BATCH_LIMIT};
use batchline_retry::{RetryExecutor, RetryPolicy};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

const SEND: &str = "send_message";
const SEND_BATCH: &str = "send_message_batch";
const RECEIVE: &str = "receive_message";
const DELETE: &str = "delete_message";
const RELEASE: &str = "change_message_visibility";

/// Sends and receives JSON values through a `QueueTransport`
///
/// Every transport call runs under one shared retry policy. Values are
/// encoded and size checked before the transport is touched. Delivery is
/// at-least-once: a retried request may enqueue a body twice.
#[derive(Debug, Clone)]
pub struct QueueClient<Q> {
    transport: Q,
    codec: Codec,
    executor: RetryExecutor,
    batch_limit: usize,
    concurrency: usize,
    compressed_bodies: bool,
}

impl<Q: QueueTransport> QueueClient<Q> {
    /// Client with default codec and retry settings, reading plain bodies
    #[must_use]
    pub fn new(transport: Q) -> Self {
        Self {
            transport,
            codec: Codec::default(),
            executor: RetryExecutor::default(),
            batch_limit: QUEUE_BATCH_LIMIT,
            concurrency: 1,
            compressed_bodies: false,
        }
    }

    /// Client tuned by `config`
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation
    pub fn from_config(transport: Q, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            codec: Codec::new(CodecConfig::from_config(config)),
            executor: RetryExecutor::new(RetryPolicy::from_config(config)),
            batch_limit: config.queue_batch_limit.min(QUEUE_BATCH_LIMIT),
            concurrency: config.concurrency.max(1),
            compressed_bodies: false,
        })
    }

    /// Replace the codec settings
    #[must_use]
    pub fn with_codec(mut self, config: CodecConfig) -> Self {
        self.codec = Codec::new(config);
        self
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

    /// Allow up to `limit` batch requests in flight during `send_batch`
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Decode received bodies as gzip + base64 instead of plain JSON
    #[must_use]
    pub fn with_compressed_bodies(mut self, compressed: bool) -> Self {
        self.compressed_bodies = compressed;
        self
    }

    /// Underlying transport
    #[must_use]
    pub fn transport(&self) -> &Q {
        &self.transport
    }

    /// Retry executor shared by every call
    #[must_use]
    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Encode `value` and enqueue it
    ///
    /// # Errors
    /// - `PayloadTooLarge` before any transport call
    /// - transport errors once retries are exhausted
    pub async fn send<T>(&self, value: &T, compress: bool) -> Result<Ack>
    where
        T: Serialize + ?Sized,
    {
        let payload = self.codec.encode(value, compress)?;
        self.executor
            .run(SEND, || self.transport.enqueue(payload.as_bytes()))
            .await
    }

    /// Encode every value, then enqueue them in batches of at most ten
    ///
    /// Acks are returned in completion order.
    ///
    /// # Errors
    /// - `PayloadTooLarge` for the first oversize value, before any
    ///   transport call
    /// - `Aggregate` carrying every rejected entry
    /// - transport errors once retries are exhausted
    pub async fn send_batch<T>(&self, values: &[T], compress: bool) -> Result<Vec<Ack>>
    where
        T: Serialize,
    {
        let bodies = values
            .iter()
            .map(|value| self.codec.encode(value, compress).map(EncodedPayload::into_bytes))
            .collect::<Result<Vec<_>>>()?;

        match plan(&bodies, self.batch_limit)? {
            Plan::Empty => Ok(Vec::new()),
            Plan::Single(body) => {
                match self.executor.run(SEND, || self.transport.enqueue(&body)).await {
                    Ok(ack) => Ok(vec![ack]),
                    Err(BatchlineError::Rejected(rejection)) => {
                        LoggingTransformer::log_batch_outcome(SEND, 0, 1);
                        Err(BatchlineError::aggregate(vec![rejection]))
                    }
                    Err(err) => Err(err),
                }
            }
            Plan::Batches(batches) => self.send_batches(bodies.len(), batches).await,
        }
    }

    /// Dequeue up to `max` messages, clamped to 1..=10, and decode them
    ///
    /// Bodies are decoded according to `with_compressed_bodies`; the
    /// encoding is never guessed.
    ///
    /// # Errors
    /// - `UndecodableMessage` naming the first corrupt delivery and its
    ///   receipt, so it can be acknowledged or dead-lettered. The other
    ///   deliveries of the call are released back to the queue. Not retried.
    /// - transport errors once retries are exhausted
    pub async fn receive<T>(&self, max: usize) -> Result<Vec<Message<T>>>
    where
        T: DeserializeOwned,
    {
        let max = max.clamp(1, self.batch_limit);
        let envelopes = self
            .executor
            .run(RECEIVE, || self.transport.dequeue(max))
            .await?;
        debug!(requested = max, received = envelopes.len(), "messages dequeued");

        let encoding = Encoding::from_flag(self.compressed_bodies);
        let mut messages = Vec::with_capacity(envelopes.len());
        for (index, envelope) in envelopes.iter().enumerate() {
            match self.codec.decode::<T>(&envelope.body, self.compressed_bodies) {
                Ok(value) => messages.push(Message {
                    message_id: envelope.message_id.clone(),
                    receipt: envelope.receipt.clone(),
                    encoding,
                    value,
                }),
                Err(err) => {
                    let others: Vec<&str> = envelopes
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != index)
                        .map(|(_, other)| other.receipt.as_str())
                        .collect();
                    self.release_all(&others).await;
                    return Err(BatchlineError::undecodable(
                        envelope.message_id.clone(),
                        envelope.receipt.clone(),
                        err,
                    ));
                }
            }
        }
        Ok(messages)
    }

    /// Delete a processed message
    ///
    /// # Errors
    /// Transport errors once retries are exhausted
    pub async fn acknowledge<T>(&self, message: &Message<T>) -> Result<()> {
        self.acknowledge_receipt(&message.receipt).await
    }

    /// Delete a delivery by receipt, e.g. one reported by `UndecodableMessage`
    ///
    /// # Errors
    /// Transport errors once retries are exhausted
    pub async fn acknowledge_receipt(&self, receipt: &str) -> Result<()> {
        self.executor
            .run(DELETE, || self.transport.delete(receipt))
            .await
    }

    // Reverse order so queues that release to the front keep FIFO order
    async fn release_all(&self, receipts: &[&str]) {
        for receipt in receipts.iter().rev() {
            if let Err(err) = self
                .executor
                .run(RELEASE, || self.transport.release(receipt))
                .await
            {
                warn!(receipt = *receipt, error = %err, "delivery left for queue redelivery");
            }
        }
    }

    async fn send_batches(&self, total: usize, batches: Vec<Vec<Vec<u8>>>) -> Result<Vec<Ack>> {
        LoggingTransformer::log_batch_plan(SEND_BATCH, total, batches.len());

        let mut aggregator = Aggregator::<Vec<Ack>>::new();
        let mut in_flight = stream::iter(batches)
            .map(|batch| self.send_chunk(batch))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = in_flight.next().await {
            aggregator.push(outcome?);
        }

        LoggingTransformer::log_batch_outcome(SEND_BATCH, aggregator.values(), aggregator.errors().len());
        aggregator.finish().map_err(BatchlineError::from)
    }

    async fn send_chunk(&self, bodies: Vec<Vec<u8>>) -> Result<ChunkOutcome<Ack>> {
        let outcome = self
            .executor
            .run(SEND_BATCH, || self.transport.enqueue_batch(&bodies))
            .await?;
        Ok(ChunkOutcome::new(outcome.acks, outcome.errors))
    }
}
