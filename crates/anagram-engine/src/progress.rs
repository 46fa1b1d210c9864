use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Shared, eventually consistent progress counters.
///
/// The collector mirrors its found-count here and workers publish their
/// odometer position every few steps; readers only ever get snapshots.
#[derive(Debug)]
pub struct Progress {
    total_anagrams: u64,
    share: u64,
    found: AtomicU64,
    positions: Vec<AtomicU64>,
}

impl Progress {
    /// Creates counters for `workers` partitions of `share` positions each.
    pub fn new(total_anagrams: u64, share: u64, workers: usize) -> Self {
        Self {
            total_anagrams,
            share,
            found: AtomicU64::new(0),
            positions: (0..workers).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Publishes the collector's found-count.
    pub fn set_found(&self, found: u64) {
        self.found.store(found, Ordering::Relaxed);
    }

    /// Publishes a worker's position.
    pub fn set_position(&self, partition: u8, position: u64) {
        if let Some(slot) = self.positions.get(usize::from(partition)) {
            slot.store(position, Ordering::Relaxed);
        }
    }

    /// Positions in one partition.
    pub fn share(&self) -> u64 {
        self.share
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            found: self.found.load(Ordering::Relaxed),
            total_anagrams: self.total_anagrams,
            workers: self
                .positions
                .iter()
                .enumerate()
                .map(|(partition, slot)| WorkerProgress {
                    partition: partition as u8,
                    position: slot.load(Ordering::Relaxed),
                    share: self.share,
                })
                .collect(),
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        100.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Point-in-time view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Anagrams written to the sink, earlier runs included.
    pub found: u64,
    /// Distinct anagrams of the token.
    pub total_anagrams: u64,
    /// Per-partition positions.
    pub workers: Vec<WorkerProgress>,
}

impl ProgressSnapshot {
    /// Share of anagrams found, in percent.
    pub fn found_percent(&self) -> f64 {
        percent(self.found, self.total_anagrams)
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} ({:.2}%) anagrams found",
            self.found,
            self.total_anagrams,
            self.found_percent()
        )
    }
}

/// Position of one worker inside its partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProgress {
    /// Partition index.
    pub partition: u8,
    /// Positions visited.
    pub position: u64,
    /// Positions in the partition.
    pub share: u64,
}

impl WorkerProgress {
    /// Share of the partition visited, in percent.
    pub fn percent(&self) -> f64 {
        percent(self.position, self.share)
    }
}

impl fmt::Display for WorkerProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Worker {}: {} / {} ({:.2}%)",
            u16::from(self.partition) + 1,
            self.position,
            self.share,
            self.percent()
        )
    }
}
