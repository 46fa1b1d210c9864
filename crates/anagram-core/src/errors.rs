//! Structured error types shared across the anagram crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AnagramError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (partition, path, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the enumeration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum AnagramError {
    /// The input token cannot be enumerated.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Persisted state needed to resume a run is missing or inconsistent.
    #[error("resume error: {0}")]
    Resume(ErrorInfo),
    /// A size computation exceeded the 64-bit range.
    #[error("overflow: {0}")]
    Overflow(ErrorInfo),
    /// Appending to or flushing the output sink failed.
    #[error("sink error: {0}")]
    Sink(ErrorInfo),
    /// Writing or clearing a checkpoint record failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(ErrorInfo),
    /// A worker stopped on a local fatal failure.
    #[error("worker error: {0}")]
    Worker(ErrorInfo),
    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl AnagramError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AnagramError::Input(info)
            | AnagramError::Resume(info)
            | AnagramError::Overflow(info)
            | AnagramError::Sink(info)
            | AnagramError::Checkpoint(info)
            | AnagramError::Worker(info)
            | AnagramError::Config(info) => info,
        }
    }

    /// Returns the partition recorded in the error context, if any.
    pub fn partition(&self) -> Option<u8> {
        self.info()
            .context
            .get("partition")
            .and_then(|raw| raw.parse().ok())
    }

    /// Returns a copy of the error with an extra context entry.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self {
            AnagramError::Input(info) => AnagramError::Input(info.with_context(key, value)),
            AnagramError::Resume(info) => AnagramError::Resume(info.with_context(key, value)),
            AnagramError::Overflow(info) => AnagramError::Overflow(info.with_context(key, value)),
            AnagramError::Sink(info) => AnagramError::Sink(info.with_context(key, value)),
            AnagramError::Checkpoint(info) => {
                AnagramError::Checkpoint(info.with_context(key, value))
            }
            AnagramError::Worker(info) => AnagramError::Worker(info.with_context(key, value)),
            AnagramError::Config(info) => AnagramError::Config(info.with_context(key, value)),
        }
    }
}
