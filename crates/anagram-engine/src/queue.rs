use std::time::Duration;

use anagram_core::errors::ErrorInfo;
use anagram_core::AnagramError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Outcome of a dequeue attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeue {
    /// An accepted candidate.
    Item(String),
    /// Nothing buffered right now; producers may still enqueue.
    Empty,
    /// Every producer is gone and the buffer is drained.
    Closed,
}

/// Creates an unbounded result queue.
///
/// The producer half is cloned once per worker. [`Dequeue::Closed`] is only
/// observed after every producer has been dropped and every buffered item
/// has been dequeued, so a consumer that stops on `Closed` never loses an
/// item enqueued by a terminating worker.
pub fn result_queue() -> (QueueProducer, QueueConsumer) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (QueueProducer { sender }, QueueConsumer { receiver })
}

/// Enqueue handle owned by a worker.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    sender: Sender<String>,
}

impl QueueProducer {
    /// Publishes an accepted candidate. Fails only if the consumer is gone.
    pub fn enqueue(&self, candidate: String) -> Result<(), AnagramError> {
        self.sender.send(candidate).map_err(|_| {
            AnagramError::Worker(ErrorInfo::new(
                "queue-closed",
                "result queue consumer has been dropped",
            ))
        })
    }
}

/// Dequeue handle owned by the collector.
#[derive(Debug)]
pub struct QueueConsumer {
    receiver: Receiver<String>,
}

impl QueueConsumer {
    /// Non-blocking dequeue.
    pub fn try_dequeue(&self) -> Dequeue {
        match self.receiver.try_recv() {
            Ok(candidate) => Dequeue::Item(candidate),
            Err(TryRecvError::Empty) => Dequeue::Empty,
            Err(TryRecvError::Disconnected) => Dequeue::Closed,
        }
    }

    /// Waits at most `timeout` for an item.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Dequeue {
        match self.receiver.recv_timeout(timeout) {
            Ok(candidate) => Dequeue::Item(candidate),
            Err(RecvTimeoutError::Timeout) => Dequeue::Empty,
            Err(RecvTimeoutError::Disconnected) => Dequeue::Closed,
        }
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
