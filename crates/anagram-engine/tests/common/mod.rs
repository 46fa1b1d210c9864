#![allow(dead_code)]

use std::collections::BTreeSet;

use anagram_core::AnagramError;
use anagram_engine::{CancelToken, RunConfig, Sink};

/// Distinct permutations of `word`, computed independently of the engine.
pub fn reference_anagrams(word: &str) -> BTreeSet<String> {
    fn walk(rest: &mut Vec<char>, prefix: &mut String, out: &mut BTreeSet<String>) {
        if rest.is_empty() {
            out.insert(prefix.clone());
            return;
        }
        for index in 0..rest.len() {
            let c = rest.remove(index);
            prefix.push(c);
            walk(rest, prefix, out);
            prefix.pop();
            rest.insert(index, c);
        }
    }
    let mut out = BTreeSet::new();
    walk(&mut word.chars().collect(), &mut String::new(), &mut out);
    out
}

/// Asserts that `lines` holds every reference anagram exactly once.
pub fn assert_exact_anagrams(word: &str, lines: &[String]) {
    let unique: BTreeSet<String> = lines.iter().cloned().collect();
    assert_eq!(unique.len(), lines.len(), "duplicate lines for {word}");
    assert_eq!(unique, reference_anagrams(word), "wrong anagram set for {word}");
}

/// Config tuned for tests: tight polling, no periodic log lines.
pub fn test_config() -> RunConfig {
    RunConfig {
        poll_interval_ms: 1,
        progress_interval_ms: 0,
        progress_stride: 1024,
        report_every: 0,
        ..RunConfig::default()
    }
}

/// Sink wrapper that triggers cancellation after a number of appends.
pub struct CancelAfter<S> {
    pub inner: S,
    pub cancel: CancelToken,
    pub remaining: usize,
}

impl<S: Sink> CancelAfter<S> {
    pub fn new(inner: S, cancel: CancelToken, appends: usize) -> Self {
        Self {
            inner,
            cancel,
            remaining: appends,
        }
    }
}

impl<S: Sink> Sink for CancelAfter<S> {
    fn append(&mut self, candidate: &str) -> Result<(), AnagramError> {
        self.inner.append(candidate)?;
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.cancel.cancel();
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AnagramError> {
        self.inner.flush()
    }

    fn existing_lines(&self) -> Result<u64, AnagramError> {
        self.inner.existing_lines()
    }
}
