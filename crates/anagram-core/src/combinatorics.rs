//! Sizing helpers for the permutation space.
//!
//! Every function uses checked arithmetic and reports [`AnagramError::Overflow`]
//! rather than wrapping; `21!` is already outside the `u64` range.

use crate::errors::{AnagramError, ErrorInfo};
use crate::token::Token;

fn overflow(what: &str, detail: impl ToString) -> AnagramError {
    AnagramError::Overflow(
        ErrorInfo::new("u64-overflow", format!("{what} does not fit in 64 bits"))
            .with_context("input", detail.to_string()),
    )
}

/// Returns `n!`.
pub fn factorial(n: u64) -> Result<u64, AnagramError> {
    let mut product: u64 = 1;
    for i in 2..=n {
        product = product
            .checked_mul(i)
            .ok_or_else(|| overflow("factorial", n))?;
    }
    Ok(product)
}

/// Number of sequences of `length` symbols over `alphabet_size` symbols (`A^L`).
pub fn total_permutations(alphabet_size: usize, length: usize) -> Result<u64, AnagramError> {
    let exponent = u32::try_from(length).map_err(|_| overflow("permutation count", length))?;
    (alphabet_size as u64)
        .checked_pow(exponent)
        .ok_or_else(|| overflow("permutation count", format!("{alphabet_size}^{length}")))
}

/// Size of one worker's partition (`A^L / A`).
pub fn per_worker_share(alphabet_size: usize, length: usize) -> Result<u64, AnagramError> {
    let total = total_permutations(alphabet_size, length)?;
    Ok(total / alphabet_size.max(1) as u64)
}

/// Number of distinct anagrams: `L! / Π(c!)` over characters occurring more than once.
pub fn total_anagrams(token: &Token) -> Result<u64, AnagramError> {
    let numerator = factorial(token.len() as u64)?;
    let mut duplicates: u64 = 1;
    for &count in token.alphabet().required_counts() {
        if count > 1 {
            duplicates = duplicates
                .checked_mul(factorial(u64::from(count))?)
                .ok_or_else(|| overflow("duplicate factorial product", token.as_str()))?;
        }
    }
    Ok(numerator / duplicates)
}
