use serde::{Deserialize, Serialize};

use crate::errors::{AnagramError, ErrorInfo};

/// Largest alphabet the engine can enumerate; digits are stored as `u8`.
pub const MAX_ALPHABET: usize = 256;

/// Distinct characters of a token in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<char>,
    required: Vec<u32>,
}

impl Alphabet {
    fn from_chars(chars: &[char]) -> Self {
        let mut symbols: Vec<char> = Vec::new();
        let mut required: Vec<u32> = Vec::new();
        for &c in chars {
            match symbols.iter().position(|&s| s == c) {
                Some(index) => required[index] += 1,
                None => {
                    symbols.push(c);
                    required.push(1);
                }
            }
        }
        Self { symbols, required }
    }

    /// Number of distinct symbols (`A`).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true when the alphabet holds no symbol.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol selected by a digit.
    pub fn symbol(&self, digit: u8) -> char {
        self.symbols[digit as usize]
    }

    /// All symbols in first-occurrence order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Occurrence count of each symbol in the token, indexed like [`Alphabet::symbols`].
    pub fn required_counts(&self) -> &[u32] {
        &self.required
    }
}

/// Immutable input token together with its derived alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    text: String,
    chars: Vec<char>,
    alphabet: Alphabet,
}

impl Token {
    /// Parses a token, rejecting empty input and alphabets that do not fit a `u8` digit.
    pub fn new(text: impl Into<String>) -> Result<Self, AnagramError> {
        let text = text.into();
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Err(AnagramError::Input(
                ErrorInfo::new("empty-token", "no input word provided")
                    .with_hint("pass the word to enumerate as the first argument"),
            ));
        }
        let alphabet = Alphabet::from_chars(&chars);
        if alphabet.len() > MAX_ALPHABET {
            return Err(AnagramError::Input(
                ErrorInfo::new("alphabet-too-large", "too many distinct characters")
                    .with_context("distinct", alphabet.len().to_string())
                    .with_context("max", MAX_ALPHABET.to_string()),
            ));
        }
        Ok(Self {
            text,
            chars,
            alphabet,
        })
    }

    /// Original text of the token.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Characters of the token in order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Token length in characters (`L`).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false: empty tokens are rejected by [`Token::new`].
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Distinct-character alphabet of the token.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}
