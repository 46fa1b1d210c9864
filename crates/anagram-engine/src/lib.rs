#![deny(missing_docs)]
#![doc = "Concurrent, resumable enumeration of every distinct anagram of a token."]

//! One worker per distinct character walks its own partition of the `A^L`
//! sequence space with an odometer, pushes valid anagrams onto an unbounded
//! queue, and a single collector appends them to the sink. Cancellation is
//! cooperative; each stopped worker persists the next position it would have
//! visited so a later run continues without duplicates or gaps.

/// Cooperative cancellation flag.
pub mod cancel;
/// Checkpoint records and their stores.
pub mod checkpoint;
/// Queue-to-sink drain loop.
pub mod collector;
/// YAML configuration schema and defaults.
pub mod config;
/// Run orchestration and resume logic.
pub mod coordinator;
pub mod odometer;
/// Shared progress counters and snapshots.
pub mod progress;
/// Unbounded result queue.
pub mod queue;
/// Output sinks.
pub mod sink;
/// Per-partition enumeration loop.
pub mod worker;

pub use cancel::CancelToken;
pub use checkpoint::{
    Checkpoint, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore, PartitionState,
};
pub use collector::Collector;
pub use config::{OutputConfig, RunConfig};
pub use coordinator::{Coordinator, RunMode, RunPlan, RunReport, RunStatus, WorkerSummary};
pub use odometer::{Odometer, Step};
pub use progress::{Progress, ProgressSnapshot, WorkerProgress};
pub use queue::{result_queue, Dequeue, QueueConsumer, QueueProducer};
pub use sink::{count_lines, FileSink, MemorySink, Sink};
pub use worker::{Worker, WorkerEnv, WorkerOutcome, WorkerStatus};
