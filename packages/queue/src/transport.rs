//! Provider boundary for queue delivery

use crate::types::{Ack, BatchEnqueue, Envelope};
use batchline_common::{BatchlineError, Result};
use std::future::Future;
use std::sync::Arc;

/// A message queue reachable over some transport
///
/// Implementations tag their own failures: dropped or reset connections
/// become `TransportTransient`, everything else `TransportTerminal`. A
/// refused entry inside a batch is reported as `Rejected`.
pub trait QueueTransport: Send + Sync {
    /// Enqueue one encoded body
    fn enqueue(&self, body: &[u8]) -> impl Future<Output = Result<Ack>> + Send;

    /// Take up to `max` messages
    fn dequeue(&self, max: usize) -> impl Future<Output = Result<Vec<Envelope>>> + Send;

    /// Remove a delivered message by its receipt
    fn delete(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send;

    /// Make a delivery visible to consumers again
    ///
    /// The default leaves it to the queue's own redelivery timeout.
    fn release(&self, _receipt: &str) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Enqueue several bodies in one request
    ///
    /// The default sends each body in turn, collecting `Rejected` entries
    /// and stopping at the first other error.
    fn enqueue_batch(&self, bodies: &[Vec<u8>]) -> impl Future<Output = Result<BatchEnqueue>> + Send {
        async move {
            let mut outcome = BatchEnqueue::default();
            for body in bodies {
                match self.enqueue(body).await {
                    Ok(ack) => outcome.acks.push(ack),
                    Err(BatchlineError::Rejected(rejection)) => outcome.errors.push(rejection),
                    Err(err) => return Err(err),
                }
            }
            Ok(outcome)
        }
    }
}

impl<Q: QueueTransport> QueueTransport for Arc<Q> {
    fn enqueue(&self, body: &[u8]) -> impl Future<Output = Result<Ack>> + Send {
        (**self).enqueue(body)
    }

    fn dequeue(&self, max: usize) -> impl Future<Output = Result<Vec<Envelope>>> + Send {
        (**self).dequeue(max)
    }

    fn delete(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(receipt)
    }

    fn release(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).release(receipt)
    }

    fn enqueue_batch(&self, bodies: &[Vec<u8>]) -> impl Future<Output = Result<BatchEnqueue>> + Send {
        (**self).enqueue_batch(bodies)
    }
}
