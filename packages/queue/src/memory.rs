//! In-process queue transport

use crate::transport::QueueTransport;
use crate::types::{Ack, Envelope};
use batchline_common::{BatchlineError, Result};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Stored {
    message_id: String,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    ready: VecDeque<Stored>,
    in_flight: HashMap<String, Stored>,
}

/// FIFO queue held in memory
///
/// Dequeued messages stay in flight until deleted by receipt, or until
/// `release_in_flight` puts them back.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    state: Mutex<State>,
}

impl MemoryQueue {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages waiting to be dequeued
    ///
    /// # Errors
    /// Returns `TransportTerminal` if the queue lock is poisoned
    pub fn ready(&self) -> Result<usize> {
        Ok(self.lock()?.ready.len())
    }

    /// Messages handed out but not yet deleted
    ///
    /// # Errors
    /// Returns `TransportTerminal` if the queue lock is poisoned
    pub fn in_flight(&self) -> Result<usize> {
        Ok(self.lock()?.in_flight.len())
    }

    /// Return every undeleted delivery to the front of the queue
    ///
    /// # Errors
    /// Returns `TransportTerminal` if the queue lock is poisoned
    pub fn release_in_flight(&self) -> Result<usize> {
        let mut state = self.lock()?;
        let mut released: Vec<Stored> = state.in_flight.drain().map(|(_, m)| m).collect();
        released.sort_by(|a, b| a.message_id.cmp(&b.message_id));
        let count = released.len();
        for message in released.into_iter().rev() {
            state.ready.push_front(message);
        }
        Ok(count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| BatchlineError::terminal("memory queue lock poisoned"))
    }

    fn push(&self, body: &[u8]) -> Result<Ack> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let message_id = format!("msg-{:08}", state.next_id);
        state.ready.push_back(Stored {
            message_id: message_id.clone(),
            body: body.to_vec(),
        });
        Ok(Ack::new(message_id))
    }

    fn pop(&self, max: usize) -> Result<Vec<Envelope>> {
        let mut state = self.lock()?;
        let take = max.min(state.ready.len());
        let mut envelopes = Vec::with_capacity(take);
        for _ in 0..take {
            let Some(message) = state.ready.pop_front() else {
                break;
            };
            state.next_id += 1;
            let receipt = format!("{}-r{}", message.message_id, state.next_id);
            envelopes.push(Envelope {
                message_id: message.message_id.clone(),
                receipt: receipt.clone(),
                body: message.body.clone(),
            });
            state.in_flight.insert(receipt, message);
        }
        Ok(envelopes)
    }

    fn restore(&self, receipt: &str) -> Result<()> {
        let mut state = self.lock()?;
        match state.in_flight.remove(receipt) {
            Some(message) => {
                state.ready.push_front(message);
                Ok(())
            }
            None => Err(invalid_receipt(receipt)),
        }
    }

    fn remove(&self, receipt: &str) -> Result<()> {
        let mut state = self.lock()?;
        match state.in_flight.remove(receipt) {
            Some(_) => Ok(()),
            None => Err(invalid_receipt(receipt)),
        }
    }
}

fn invalid_receipt(receipt: &str) -> BatchlineError {
    BatchlineError::rejected(
        receipt,
        "ReceiptHandleIsInvalid",
        "no in-flight message has this receipt",
    )
}

impl QueueTransport for MemoryQueue {
    fn enqueue(&self, body: &[u8]) -> impl Future<Output = Result<Ack>> + Send {
        let result = self.push(body);
        async move { result }
    }

    fn dequeue(&self, max: usize) -> impl Future<Output = Result<Vec<Envelope>>> + Send {
        let result = self.pop(max);
        async move { result }
    }

    fn delete(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.remove(receipt);
        async move { result }
    }

    fn release(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.restore(receipt);
        async move { result }
    }
}
