use crate::token::Alphabet;

/// Returns true when `candidate` holds exactly the input's character multiset.
///
/// Counts are compared for every character of the input, so a candidate
/// missing a required character is rejected even if its other counts match.
pub fn is_valid_anagram(candidate: &str, input: &str) -> bool {
    if input.chars().count() != candidate.chars().count() {
        return false;
    }
    input.chars().all(|c| {
        let wanted = input.chars().filter(|&x| x == c).count();
        let found = candidate.chars().filter(|&x| x == c).count();
        wanted == found
    })
}

/// Frequency-table check over odometer digits.
///
/// Candidates built from the alphabet can only contain alphabet symbols and
/// always have the token's length, so comparing per-digit counts against the
/// token's required counts decides the same question as [`is_valid_anagram`].
#[derive(Debug, Clone)]
pub struct Validator {
    required: Vec<u32>,
    scratch: Vec<u32>,
}

impl Validator {
    /// Creates a validator for the given alphabet.
    pub fn new(alphabet: &Alphabet) -> Self {
        Self {
            required: alphabet.required_counts().to_vec(),
            scratch: vec![0; alphabet.len()],
        }
    }

    /// Returns true when the digit sequence selects a valid anagram.
    pub fn accepts(&mut self, digits: &[u8]) -> bool {
        self.scratch.iter_mut().for_each(|slot| *slot = 0);
        for &digit in digits {
            let slot = &mut self.scratch[digit as usize];
            *slot += 1;
            if *slot > self.required[digit as usize] {
                return false;
            }
        }
        self.scratch == self.required
    }
}
