use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, PoisonError};

use anagram_core::errors::ErrorInfo;
use anagram_core::{per_worker_share, total_anagrams, total_permutations, AnagramError, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::checkpoint::CheckpointStore;
use crate::collector::Collector;
use crate::config::RunConfig;
use crate::progress::Progress;
use crate::queue::result_queue;
use crate::sink::Sink;
use crate::worker::{Worker, WorkerEnv, WorkerOutcome, WorkerStatus};

/// Where the workers start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Every partition starts at its first position.
    Fresh,
    /// Every partition continues from its checkpoint and found-count is seeded from the sink.
    Resume,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Every partition was exhausted.
    Completed,
    /// Cancellation stopped at least one partition; checkpoints were written.
    Cancelled,
}

/// Size of the search space for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Distinct characters (`A`), also the number of workers.
    pub alphabet_size: usize,
    /// Token length (`L`).
    pub length: usize,
    /// `A^L`.
    pub total_permutations: u64,
    /// Positions per partition.
    pub share: u64,
    /// Distinct anagrams of the token.
    pub total_anagrams: u64,
}

/// Final state of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Partition index.
    pub partition: u8,
    /// Terminal state.
    pub status: WorkerStatus,
    /// Positions visited, earlier runs included.
    pub position: u64,
}

/// Summary returned to callers after a run stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// How the run ended.
    pub status: RunStatus,
    /// Search space sizes.
    pub plan: RunPlan,
    /// Lines in the sink, earlier runs included.
    pub found: u64,
    /// Per-partition outcome, ordered by partition.
    pub workers: Vec<WorkerSummary>,
}

impl RunReport {
    /// Share of the distinct anagrams found, in percent.
    pub fn found_percent(&self) -> f64 {
        if self.plan.total_anagrams == 0 {
            return 100.0;
        }
        100.0 * self.found as f64 / self.plan.total_anagrams as f64
    }
}

/// Partitions the search space, runs one worker per partition and collects their output.
#[derive(Debug, Clone)]
pub struct Coordinator {
    token: Token,
    config: RunConfig,
}

impl Coordinator {
    /// Creates a coordinator for a token.
    pub fn new(token: Token, config: RunConfig) -> Self {
        Self { token, config }
    }

    /// Token being enumerated.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Computes the search space sizes; fails on 64-bit overflow.
    pub fn plan(&self) -> Result<RunPlan, AnagramError> {
        let alphabet_size = self.token.alphabet().len();
        let length = self.token.len();
        Ok(RunPlan {
            alphabet_size,
            length,
            total_permutations: total_permutations(alphabet_size, length)?,
            share: per_worker_share(alphabet_size, length)?,
            total_anagrams: total_anagrams(&self.token)?,
        })
    }

    /// Runs every partition to exhaustion or cancellation.
    ///
    /// A fresh run drops any record left by an earlier run before spawning,
    /// so a fresh run that fails leaves nothing a later resume could pair
    /// with the truncated output.
    ///
    /// The collector runs on the calling thread and returns only once every
    /// worker has reached a terminal state and the queue is drained, so the
    /// sink holds every accepted candidate when this returns. On cancellation
    /// each unfinished partition has stored its next position and each
    /// finished partition gets an exhausted record; on completion every record
    /// is cleared.
    pub fn run(
        &self,
        sink: &mut dyn Sink,
        store: &dyn CheckpointStore,
        cancel: &CancelToken,
        mode: RunMode,
    ) -> Result<RunReport, AnagramError> {
        let plan = self.plan()?;
        let found = match mode {
            RunMode::Fresh => 0,
            RunMode::Resume => sink.existing_lines()?,
        };
        let workers = self.prepare_workers(&plan, store, mode)?;
        if mode == RunMode::Fresh {
            for worker in &workers {
                store.clear(worker.partition())?;
            }
        }

        let progress = Progress::new(plan.total_anagrams, plan.share, workers.len());
        let abort = AtomicBool::new(false);
        let env = WorkerEnv {
            token: &self.token,
            cancel,
            abort: &abort,
            progress: &progress,
            store,
            progress_stride: self.config.progress_stride,
            report_every: self.config.report_every,
        };
        let slots: Vec<Mutex<Option<Result<WorkerOutcome, AnagramError>>>> =
            workers.iter().map(|_| Mutex::new(None)).collect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.len())
            .thread_name(|index| format!("anagram-worker-{index}"))
            .build()
            .map_err(|err| AnagramError::Worker(ErrorInfo::new("thread-pool", err.to_string())))?;

        info!(workers = workers.len(), "starting {} workers", workers.len());
        let (producer, consumer) = result_queue();
        let collected = pool.in_place_scope(|scope| {
            for (worker, slot) in workers.into_iter().zip(&slots) {
                let producer = producer.clone();
                let env = &env;
                scope.spawn(move |_| {
                    let outcome = worker.run(env, producer);
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
                });
            }
            drop(producer);
            Collector::new(
                consumer,
                sink,
                &progress,
                cancel,
                &abort,
                found,
                self.config.poll_interval(),
                self.config.progress_interval(),
            )
            .run()
        });
        let found = collected?;

        let mut outcomes = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            match slot.into_inner().unwrap_or_else(PoisonError::into_inner) {
                Some(Ok(outcome)) => outcomes.push(outcome),
                Some(Err(err)) => return Err(err),
                None => {
                    return Err(AnagramError::Worker(
                        ErrorInfo::new("worker-lost", "worker finished without an outcome")
                            .with_context("partition", index.to_string()),
                    ))
                }
            }
        }

        let status = self.settle_checkpoints(store, &outcomes)?;
        Ok(RunReport {
            status,
            plan,
            found,
            workers: outcomes
                .iter()
                .map(|outcome| WorkerSummary {
                    partition: outcome.partition,
                    status: outcome.status,
                    position: outcome.checkpoint.position,
                })
                .collect(),
        })
    }

    fn prepare_workers(
        &self,
        plan: &RunPlan,
        store: &dyn CheckpointStore,
        mode: RunMode,
    ) -> Result<Vec<Worker>, AnagramError> {
        (0..plan.alphabet_size)
            .map(|index| {
                let partition = u8::try_from(index).map_err(|_| {
                    AnagramError::Input(
                        ErrorInfo::new("alphabet-too-large", "partition index exceeds u8")
                            .with_context("partition", index.to_string()),
                    )
                })?;
                match mode {
                    RunMode::Fresh => Worker::new(&self.token, partition),
                    RunMode::Resume => {
                        let checkpoint = store.load(partition)?;
                        Worker::resume(&self.token, partition, &checkpoint)
                    }
                }
            })
            .collect()
    }

    fn settle_checkpoints(
        &self,
        store: &dyn CheckpointStore,
        outcomes: &[WorkerOutcome],
    ) -> Result<RunStatus, AnagramError> {
        let finished = outcomes
            .iter()
            .all(|outcome| outcome.status == WorkerStatus::Completed);
        if finished {
            for outcome in outcomes {
                store.clear(outcome.partition)?;
            }
            debug!("every partition exhausted, checkpoints cleared");
            return Ok(RunStatus::Completed);
        }
        for outcome in outcomes
            .iter()
            .filter(|outcome| outcome.status == WorkerStatus::Completed)
        {
            store.store(outcome.partition, &outcome.checkpoint)?;
            debug!(partition = outcome.partition, "recorded exhausted partition");
        }
        Ok(RunStatus::Cancelled)
    }
}
