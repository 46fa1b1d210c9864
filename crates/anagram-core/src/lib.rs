#![deny(missing_docs)]
//! Core types for the anagram enumerator: input token, sizing, validation
//! and the shared error surface.

/// Permutation and anagram counts.
pub mod combinatorics;
pub mod errors;
/// Input token and its distinct-character alphabet.
pub mod token;
/// Candidate validation.
pub mod validator;

pub use combinatorics::{factorial, per_worker_share, total_anagrams, total_permutations};
pub use errors::{AnagramError, ErrorInfo};
pub use token::{Alphabet, Token, MAX_ALPHABET};
pub use validator::{is_valid_anagram, Validator};
