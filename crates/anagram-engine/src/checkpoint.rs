use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anagram_core::errors::ErrorInfo;
use anagram_core::AnagramError;
use serde::{Deserialize, Serialize};

const EXHAUSTED_MARKER: &str = "exhausted";

/// Whether a partition still has positions left to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionState {
    /// `digits` is the next position to visit.
    Pending,
    /// The partition was enumerated to the end.
    Exhausted,
}

/// Durable snapshot of one worker's odometer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Number of positions visited since the partition was first started.
    pub position: u64,
    /// Odometer digits, digit 0 being the partition index.
    pub digits: Vec<u8>,
    /// Completion state of the partition.
    pub state: PartitionState,
}

impl Checkpoint {
    /// Renders the record as text: position, one digit per line, optional exhaustion marker.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.digits.len() + 2);
        lines.push(self.position.to_string());
        lines.extend(self.digits.iter().map(|digit| digit.to_string()));
        if self.state == PartitionState::Exhausted {
            lines.push(EXHAUSTED_MARKER.to_string());
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Parses the text layout produced by [`Checkpoint::to_text`].
    pub fn from_text(text: &str) -> Result<Self, AnagramError> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let first = lines
            .next()
            .ok_or_else(|| malformed("empty checkpoint record", 1))?;
        let position = first
            .parse::<u64>()
            .map_err(|err| malformed(format!("invalid position: {err}"), 1))?;
        let mut digits = Vec::new();
        let mut state = PartitionState::Pending;
        for (offset, line) in lines.enumerate() {
            let line_no = offset + 2;
            if state == PartitionState::Exhausted {
                return Err(malformed("data after exhaustion marker", line_no));
            }
            if line == EXHAUSTED_MARKER {
                state = PartitionState::Exhausted;
                continue;
            }
            let digit = line
                .parse::<u8>()
                .map_err(|err| malformed(format!("invalid digit: {err}"), line_no))?;
            digits.push(digit);
        }
        if digits.is_empty() {
            return Err(malformed("checkpoint record has no digits", 2));
        }
        Ok(Self {
            position,
            digits,
            state,
        })
    }
}

fn malformed(message: impl Into<String>, line: usize) -> AnagramError {
    AnagramError::Resume(
        ErrorInfo::new("checkpoint-malformed", message).with_context("line", line.to_string()),
    )
}

fn missing(partition: u8) -> AnagramError {
    AnagramError::Resume(
        ErrorInfo::new("checkpoint-missing", "no checkpoint record for partition")
            .with_context("partition", partition.to_string())
            .with_hint("start a fresh run without --resume"),
    )
}

/// Durable per-partition storage of checkpoint records.
pub trait CheckpointStore: Send + Sync {
    /// Loads the record of a partition; a missing record is an error.
    fn load(&self, partition: u8) -> Result<Checkpoint, AnagramError>;

    /// Replaces the record of a partition.
    fn store(&self, partition: u8, checkpoint: &Checkpoint) -> Result<(), AnagramError>;

    /// Removes the record of a partition if one exists.
    fn clear(&self, partition: u8) -> Result<(), AnagramError>;
}

/// Stores each record as `<dir>/<prefix><partition>.txt`.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
    prefix: String,
}

impl FileCheckpointStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the record for a partition.
    pub fn path(&self, partition: u8) -> PathBuf {
        self.dir.join(format!("{}{}.txt", self.prefix, partition))
    }

    fn io_error(code: &str, path: &Path, partition: u8, err: impl ToString) -> AnagramError {
        AnagramError::Checkpoint(
            ErrorInfo::new(code, err.to_string())
                .with_context("path", path.display().to_string())
                .with_context("partition", partition.to_string()),
        )
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, partition: u8) -> Result<Checkpoint, AnagramError> {
        let path = self.path(partition);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(missing(partition).with_context("path", path.display().to_string()))
            }
            Err(err) => {
                return Err(AnagramError::Resume(
                    ErrorInfo::new("checkpoint-read", err.to_string())
                        .with_context("path", path.display().to_string())
                        .with_context("partition", partition.to_string()),
                ))
            }
        };
        Checkpoint::from_text(&contents).map_err(|err| {
            err.with_context("partition", partition.to_string())
                .with_context("path", path.display().to_string())
        })
    }

    fn store(&self, partition: u8, checkpoint: &Checkpoint) -> Result<(), AnagramError> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| Self::io_error("checkpoint-mkdir", &self.dir, partition, err))?;
        let path = self.path(partition);
        let staging = path.with_extension("txt.tmp");
        fs::write(&staging, checkpoint.to_text())
            .map_err(|err| Self::io_error("checkpoint-write", &staging, partition, err))?;
        fs::rename(&staging, &path)
            .map_err(|err| Self::io_error("checkpoint-rename", &path, partition, err))
    }

    fn clear(&self, partition: u8) -> Result<(), AnagramError> {
        let path = self.path(partition);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error("checkpoint-clear", &path, partition, err)),
        }
    }
}

/// In-process store used by tests and embedders that persist records elsewhere.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: Mutex<BTreeMap<u8, Checkpoint>>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record keyed by partition.
    pub fn records(&self) -> BTreeMap<u8, Checkpoint> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u8, Checkpoint>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, partition: u8) -> Result<Checkpoint, AnagramError> {
        self.lock()
            .get(&partition)
            .cloned()
            .ok_or_else(|| missing(partition))
    }

    fn store(&self, partition: u8, checkpoint: &Checkpoint) -> Result<(), AnagramError> {
        self.lock().insert(partition, checkpoint.clone());
        Ok(())
    }

    fn clear(&self, partition: u8) -> Result<(), AnagramError> {
        self.lock().remove(&partition);
        Ok(())
    }
}
