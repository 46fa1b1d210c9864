use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anagram_core::AnagramError;
use tracing::info;

use crate::cancel::CancelToken;
use crate::progress::Progress;
use crate::queue::{Dequeue, QueueConsumer};
use crate::sink::Sink;

/// Single consumer moving accepted candidates from the queue to the sink.
pub struct Collector<'a, S: Sink + ?Sized> {
    consumer: QueueConsumer,
    sink: &'a mut S,
    progress: &'a Progress,
    cancel: &'a CancelToken,
    abort: &'a AtomicBool,
    found: u64,
    poll_interval: Duration,
    progress_interval: Duration,
}

impl<'a, S: Sink + ?Sized> Collector<'a, S> {
    /// Creates a collector whose found-count starts at `found`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        consumer: QueueConsumer,
        sink: &'a mut S,
        progress: &'a Progress,
        cancel: &'a CancelToken,
        abort: &'a AtomicBool,
        found: u64,
        poll_interval: Duration,
        progress_interval: Duration,
    ) -> Self {
        progress.set_found(found);
        Self {
            consumer,
            sink,
            progress,
            cancel,
            abort,
            found,
            poll_interval,
            progress_interval,
        }
    }

    /// Drains until every producer is gone and the queue is empty, then flushes the sink.
    ///
    /// Returns the final found-count. A sink failure raises the abort flag so
    /// workers stop without checkpointing, and is returned unchanged.
    pub fn run(mut self) -> Result<u64, AnagramError> {
        let result = self.drain();
        if result.is_err() {
            self.abort.store(true, Ordering::Release);
        }
        result
    }

    fn drain(&mut self) -> Result<u64, AnagramError> {
        let mut last_report = Instant::now();
        let mut drain_notice = false;
        loop {
            match self.consumer.dequeue_timeout(self.poll_interval) {
                Dequeue::Item(candidate) => {
                    self.write(&candidate)?;
                    while let Dequeue::Item(candidate) = self.consumer.try_dequeue() {
                        self.write(&candidate)?;
                    }
                }
                Dequeue::Empty => {}
                Dequeue::Closed => break,
            }

            if self.cancel.is_cancelled() && !drain_notice && !self.consumer.is_empty() {
                info!(
                    queued = self.consumer.len(),
                    "queue is not empty, processing remaining data before stopping"
                );
                drain_notice = true;
            }
            if !self.progress_interval.is_zero() && last_report.elapsed() >= self.progress_interval
            {
                info!(found = self.found, "{}", self.progress.snapshot());
                last_report = Instant::now();
            }
        }
        self.sink.flush()?;
        Ok(self.found)
    }

    fn write(&mut self, candidate: &str) -> Result<(), AnagramError> {
        self.sink.append(candidate)?;
        self.found += 1;
        self.progress.set_found(self.found);
        Ok(())
    }
}
