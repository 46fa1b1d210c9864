//! Fixed-width base-`A` counter describing one worker's position.
//!
//! Digit 0 is pinned to the partition index; carries propagate from the last
//! digit toward index 1 and never reach digit 0, so the `A^L` sequence space
//! splits into `A` disjoint partitions of `A^(L-1)` positions each.

use anagram_core::errors::ErrorInfo;
use anagram_core::AnagramError;

use crate::checkpoint::{Checkpoint, PartitionState};

/// Result of a single [`Odometer::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The odometer moved to the next position.
    Advanced,
    /// The partition has no further position; digits are left as they were.
    Exhausted,
}

/// Position of one worker inside its partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Odometer {
    partition: u8,
    base: usize,
    digits: Vec<u8>,
    position: u64,
    exhausted: bool,
}

impl Odometer {
    /// Starts a partition at its first position.
    pub fn new(partition: u8, base: usize, length: usize) -> Result<Self, AnagramError> {
        if usize::from(partition) >= base {
            return Err(AnagramError::Worker(
                ErrorInfo::new("partition-out-of-range", "partition index exceeds alphabet")
                    .with_context("partition", partition.to_string())
                    .with_context("alphabet", base.to_string()),
            ));
        }
        if length == 0 {
            return Err(AnagramError::Input(ErrorInfo::new(
                "empty-token",
                "odometer needs at least one digit",
            )));
        }
        let mut digits = vec![0; length];
        digits[0] = partition;
        Ok(Self {
            partition,
            base,
            digits,
            position: 0,
            exhausted: false,
        })
    }

    /// Restores a partition from a checkpoint taken by the same partition.
    pub fn resume(
        partition: u8,
        base: usize,
        length: usize,
        checkpoint: &Checkpoint,
    ) -> Result<Self, AnagramError> {
        let invalid = |code: &str, message: &str| {
            AnagramError::Resume(
                ErrorInfo::new(code, message)
                    .with_context("partition", partition.to_string())
                    .with_context("digits", format!("{:?}", checkpoint.digits)),
            )
        };
        let mut odometer = Self::new(partition, base, length)?;
        if checkpoint.digits.len() != length {
            return Err(invalid(
                "checkpoint-length",
                "digit count does not match the token length",
            ));
        }
        if checkpoint.digits[0] != partition {
            return Err(invalid(
                "checkpoint-partition",
                "pinned digit does not match the partition index",
            ));
        }
        if checkpoint
            .digits
            .iter()
            .any(|&digit| usize::from(digit) >= base)
        {
            return Err(invalid("checkpoint-digit", "digit outside the alphabet"));
        }
        odometer.digits.copy_from_slice(&checkpoint.digits);
        odometer.position = checkpoint.position;
        odometer.exhausted = checkpoint.state == PartitionState::Exhausted;
        Ok(odometer)
    }

    /// Moves to the next position, counting the one just visited.
    pub fn advance(&mut self) -> Step {
        if self.exhausted {
            return Step::Exhausted;
        }
        self.position += 1;
        let last_free = (1..self.digits.len())
            .rev()
            .find(|&index| usize::from(self.digits[index]) + 1 < self.base);
        match last_free {
            Some(index) => {
                self.digits[index] += 1;
                self.digits[index + 1..].iter_mut().for_each(|digit| *digit = 0);
                Step::Advanced
            }
            None => {
                self.exhausted = true;
                Step::Exhausted
            }
        }
    }

    /// Partition index pinned in digit 0.
    pub fn partition(&self) -> u8 {
        self.partition
    }

    /// Current digits.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Positions visited so far, cumulative across resumes.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once the last position of the partition has been visited.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Snapshot suitable for the checkpoint store.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            digits: self.digits.clone(),
            state: if self.exhausted {
                PartitionState::Exhausted
            } else {
                PartitionState::Pending
            },
        }
    }
}
