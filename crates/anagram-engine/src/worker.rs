use std::sync::atomic::{AtomicBool, Ordering};

use anagram_core::{AnagramError, Token, Validator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::odometer::{Odometer, Step};
use crate::progress::Progress;
use crate::queue::QueueProducer;

/// Terminal state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerStatus {
    /// Every position of the partition was visited.
    Completed,
    /// Cancellation was observed; a checkpoint was written.
    Cancelled,
    /// The collector failed; no checkpoint was written.
    Aborted,
}

/// What a worker hands back to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    /// Partition index.
    pub partition: u8,
    /// Terminal state.
    pub status: WorkerStatus,
    /// Final odometer state.
    pub checkpoint: Checkpoint,
}

/// Shared collaborators a worker reads while running.
pub struct WorkerEnv<'a> {
    /// Input token.
    pub token: &'a Token,
    /// User cancellation.
    pub cancel: &'a CancelToken,
    /// Raised when the collector can no longer accept candidates.
    pub abort: &'a AtomicBool,
    /// Progress counters.
    pub progress: &'a Progress,
    /// Destination of the checkpoint written on cancellation.
    pub store: &'a dyn CheckpointStore,
    /// Steps between position publications.
    pub progress_stride: u64,
    /// Steps between progress log lines (0 disables).
    pub report_every: u64,
}

/// Enumerates one partition.
#[derive(Debug)]
pub struct Worker {
    odometer: Odometer,
    validator: Validator,
    buffer: String,
}

impl Worker {
    /// Starts the partition from its first position.
    pub fn new(token: &Token, partition: u8) -> Result<Self, AnagramError> {
        let odometer = Odometer::new(partition, token.alphabet().len(), token.len())?;
        Ok(Self::with_odometer(token, odometer))
    }

    /// Continues the partition from a checkpoint.
    pub fn resume(
        token: &Token,
        partition: u8,
        checkpoint: &Checkpoint,
    ) -> Result<Self, AnagramError> {
        let odometer =
            Odometer::resume(partition, token.alphabet().len(), token.len(), checkpoint)?;
        Ok(Self::with_odometer(token, odometer))
    }

    fn with_odometer(token: &Token, odometer: Odometer) -> Self {
        Self {
            odometer,
            validator: Validator::new(token.alphabet()),
            buffer: String::with_capacity(token.as_str().len()),
        }
    }

    /// Partition index.
    pub fn partition(&self) -> u8 {
        self.odometer.partition()
    }

    /// Runs until the partition is exhausted, cancellation is observed or the run aborts.
    ///
    /// The checkpoint written on cancellation holds the next position to visit;
    /// a worker resumed from it validates that position before advancing.
    pub fn run(
        mut self,
        env: &WorkerEnv<'_>,
        producer: QueueProducer,
    ) -> Result<WorkerOutcome, AnagramError> {
        let partition = self.partition();
        let with_partition =
            |err: AnagramError| err.with_context("partition", partition.to_string());
        let label = u16::from(partition) + 1;
        if self.odometer.position() > 0 {
            let position = self.odometer.position();
            info!(partition, position, "worker {label}: resuming at {position}");
        }
        let stride = env.progress_stride.max(1);

        let status = loop {
            if self.odometer.is_exhausted() {
                break WorkerStatus::Completed;
            }
            if env.abort.load(Ordering::Acquire) {
                break WorkerStatus::Aborted;
            }
            if env.cancel.is_cancelled() {
                break WorkerStatus::Cancelled;
            }

            if self.validator.accepts(self.odometer.digits()) {
                self.materialize(env.token);
                if let Err(err) = producer.enqueue(self.buffer.clone()) {
                    if env.abort.load(Ordering::Acquire) {
                        break WorkerStatus::Aborted;
                    }
                    return Err(with_partition(err));
                }
            }

            let step = self.odometer.advance();
            let position = self.odometer.position();
            if position % stride == 0 {
                env.progress.set_position(partition, position);
            }
            if env.report_every > 0 && position % env.report_every == 0 {
                let share = env.progress.share();
                let percent = 100.0 * position as f64 / share.max(1) as f64;
                info!(
                    partition,
                    position, "worker {label}: {position} / {share} ({percent:.2}%)"
                );
            }
            if step == Step::Exhausted {
                break WorkerStatus::Completed;
            }
        };

        let checkpoint = self.odometer.checkpoint();
        let position = checkpoint.position;
        env.progress.set_position(partition, position);
        match status {
            WorkerStatus::Completed => {
                info!(partition, position, "worker {label}: done");
            }
            WorkerStatus::Cancelled => {
                env.store
                    .store(partition, &checkpoint)
                    .map_err(with_partition)?;
                info!(partition, position, "saved worker {label} at {position}");
            }
            WorkerStatus::Aborted => {
                debug!(partition, position, "worker {label}: aborted without checkpoint");
            }
        }
        drop(producer);
        Ok(WorkerOutcome {
            partition,
            status,
            checkpoint,
        })
    }

    fn materialize(&mut self, token: &Token) {
        let alphabet = token.alphabet();
        self.buffer.clear();
        self.buffer
            .extend(self.odometer.digits().iter().map(|&digit| alphabet.symbol(digit)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use crate::queue::{result_queue, Dequeue};

    fn drain(consumer: &crate::queue::QueueConsumer) -> Vec<String> {
        let mut out = Vec::new();
        while let Dequeue::Item(item) = consumer.try_dequeue() {
            out.push(item);
        }
        out
    }

    #[test]
    fn partition_emits_anagrams_starting_with_its_symbol() {
        let token = Token::new("aab").unwrap();
        let cancel = CancelToken::new();
        let abort = AtomicBool::new(false);
        let progress = Progress::new(3, 4, 2);
        let store = MemoryCheckpointStore::new();
        let env = WorkerEnv {
            token: &token,
            cancel: &cancel,
            abort: &abort,
            progress: &progress,
            store: &store,
            progress_stride: 1,
            report_every: 0,
        };
        let (producer, consumer) = result_queue();

        let outcome = Worker::new(&token, 0).unwrap().run(&env, producer).unwrap();
        assert_eq!(outcome.status, WorkerStatus::Completed);
        assert_eq!(outcome.checkpoint.position, 4);
        assert_eq!(drain(&consumer), vec!["aab".to_string(), "aba".to_string()]);
        assert_eq!(progress.snapshot().workers[0].position, 4);
        assert!(store.records().is_empty());
    }

    #[test]
    fn cancelled_worker_checkpoints_first_unvisited_position() {
        let token = Token::new("abc").unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let abort = AtomicBool::new(false);
        let progress = Progress::new(6, 9, 3);
        let store = MemoryCheckpointStore::new();
        let env = WorkerEnv {
            token: &token,
            cancel: &cancel,
            abort: &abort,
            progress: &progress,
            store: &store,
            progress_stride: 1,
            report_every: 0,
        };
        let (producer, consumer) = result_queue();

        let outcome = Worker::new(&token, 2).unwrap().run(&env, producer).unwrap();
        assert_eq!(outcome.status, WorkerStatus::Cancelled);
        assert!(drain(&consumer).is_empty());
        let saved = store.load(2).unwrap();
        assert_eq!(saved.position, 0);
        assert_eq!(saved.digits, vec![2, 0, 0]);
    }

    #[test]
    fn aborted_worker_writes_nothing() {
        let token = Token::new("abc").unwrap();
        let cancel = CancelToken::new();
        let abort = AtomicBool::new(true);
        let progress = Progress::new(6, 9, 3);
        let store = MemoryCheckpointStore::new();
        let env = WorkerEnv {
            token: &token,
            cancel: &cancel,
            abort: &abort,
            progress: &progress,
            store: &store,
            progress_stride: 1,
            report_every: 0,
        };
        let (producer, _consumer) = result_queue();

        let outcome = Worker::new(&token, 1).unwrap().run(&env, producer).unwrap();
        assert_eq!(outcome.status, WorkerStatus::Aborted);
        assert!(store.records().is_empty());
    }
}
