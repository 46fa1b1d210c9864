use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anagram_core::errors::ErrorInfo;
use anagram_core::AnagramError;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing an enumeration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Idle backoff of the collector when the queue is empty, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Period between progress log lines emitted by the collector, in milliseconds.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// Number of odometer steps between worker position publications.
    #[serde(default = "default_progress_stride")]
    pub progress_stride: u64,
    /// Number of odometer steps between per-worker progress log lines (0 disables).
    #[serde(default = "default_report_every")]
    pub report_every: u64,
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_poll_interval_ms() -> u64 {
    1
}

fn default_progress_interval_ms() -> u64 {
    5_000
}

fn default_progress_stride() -> u64 {
    1 << 16
}

fn default_report_every() -> u64 {
    5_000_000_000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            progress_stride: default_progress_stride(),
            report_every: default_report_every(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Reads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, AnagramError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AnagramError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml(&contents)
            .map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, AnagramError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|err| AnagramError::Config(ErrorInfo::new("config-parse", err.to_string())))?;
        if config.progress_stride == 0 {
            return Err(AnagramError::Config(
                ErrorInfo::new("config-invalid", "progress_stride must be positive")
                    .with_context("field", "progress_stride"),
            ));
        }
        Ok(config)
    }

    /// Collector idle backoff.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Collector progress log period.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Output file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append-only file receiving one anagram per line.
    #[serde(default = "default_sink")]
    pub sink: PathBuf,
    /// Directory holding per-worker checkpoint records.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// File name prefix of checkpoint records; the partition index and `.txt` are appended.
    #[serde(default = "default_state_prefix")]
    pub state_prefix: String,
}

fn default_sink() -> PathBuf {
    PathBuf::from("output.txt")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_state_prefix() -> String {
    "worker-state-".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            state_dir: default_state_dir(),
            state_prefix: default_state_prefix(),
        }
    }
}
