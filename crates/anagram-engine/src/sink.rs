use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anagram_core::errors::ErrorInfo;
use anagram_core::AnagramError;

/// Append-only destination for accepted candidates, one per line.
pub trait Sink: Send {
    /// Appends one candidate.
    fn append(&mut self, candidate: &str) -> Result<(), AnagramError>;

    /// Makes every appended candidate durable.
    fn flush(&mut self) -> Result<(), AnagramError>;

    /// Number of lines present before this run started writing.
    fn existing_lines(&self) -> Result<u64, AnagramError>;
}

/// Line-oriented output file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    existing: u64,
}

impl FileSink {
    /// Opens the output of an earlier run for appending.
    ///
    /// The file must exist: its line count seeds the found-count of a resumed
    /// run, so a missing file is a resume error rather than an empty start.
    pub fn append(path: impl Into<PathBuf>) -> Result<Self, AnagramError> {
        let path = path.into();
        let existing = count_lines(&path)?;
        Self::open(path, existing, false)
    }

    /// Creates `path`, discarding any previous content.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, AnagramError> {
        Self::open(path.into(), 0, true)
    }

    fn open(path: PathBuf, existing: u64, truncate: bool) -> Result<Self, AnagramError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| sink_error("sink-mkdir", parent, err))?;
        }
        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options
            .open(&path)
            .map_err(|err| sink_error("sink-open", &path, err))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            existing,
        })
    }

    /// Location of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn append(&mut self, candidate: &str) -> Result<(), AnagramError> {
        writeln!(self.writer, "{candidate}")
            .map_err(|err| sink_error("sink-append", &self.path, err))
    }

    fn flush(&mut self) -> Result<(), AnagramError> {
        self.writer
            .flush()
            .map_err(|err| sink_error("sink-flush", &self.path, err))?;
        self.writer
            .get_ref()
            .sync_data()
            .map_err(|err| sink_error("sink-sync", &self.path, err))
    }

    fn existing_lines(&self) -> Result<u64, AnagramError> {
        Ok(self.existing)
    }
}

fn sink_error(code: &str, path: &Path, err: impl ToString) -> AnagramError {
    AnagramError::Sink(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Counts the lines of an existing output file.
pub fn count_lines(path: &Path) -> Result<u64, AnagramError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(AnagramError::Resume(
                ErrorInfo::new("sink-missing", "output of the earlier run was not found")
                    .with_context("path", path.display().to_string())
                    .with_hint("start a fresh run or restore the output file"),
            ))
        }
        Err(err) => {
            return Err(AnagramError::Resume(
                ErrorInfo::new("sink-unreadable", err.to_string())
                    .with_context("path", path.display().to_string()),
            ))
        }
    };
    let mut count = 0u64;
    for line in BufReader::new(file).lines() {
        line.map_err(|err| {
            AnagramError::Resume(
                ErrorInfo::new("sink-unreadable", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        count += 1;
    }
    Ok(count)
}

/// Keeps lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    existing: u64,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that already holds the lines of an earlier run.
    pub fn with_lines(lines: Vec<String>) -> Self {
        let existing = lines.len() as u64;
        Self { lines, existing }
    }

    /// Every line, earlier runs included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the sink, returning its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Sink for MemorySink {
    fn append(&mut self, candidate: &str) -> Result<(), AnagramError> {
        self.lines.push(candidate.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AnagramError> {
        Ok(())
    }

    fn existing_lines(&self) -> Result<u64, AnagramError> {
        Ok(self.existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_previous_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        fs::write(&path, "abc\nacb\n").unwrap();

        let mut sink = FileSink::append(&path).unwrap();
        assert_eq!(sink.existing_lines().unwrap(), 2);
        sink.append("bac").unwrap();
        sink.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abc\nacb\nbac\n");
    }

    #[test]
    fn create_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("output.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale\n").unwrap();

        let mut sink = FileSink::create(&path).unwrap();
        assert_eq!(sink.existing_lines().unwrap(), 0);
        sink.append("ab").unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ab\n");
    }

    #[test]
    fn missing_file_cannot_be_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let err = FileSink::append(&path).unwrap_err();
        assert!(matches!(err, AnagramError::Resume(_)));
        assert_eq!(err.info().code, "sink-missing");
        assert!(!path.exists());
    }

    #[test]
    fn empty_file_counts_zero_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        fs::write(&path, "").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 0);
    }
}
