//! Immutable program text and the alphabet validator.

use std::fmt;

use crate::{is_operator, SyntaxError};

/// Loaded program source, indexed by character.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Program {
    source: Box<[char]>,
}

impl Program {
    /// Captures `source` as a program.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
        }
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns `true` when nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Character at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<char> {
        self.source.get(index).copied()
    }

    /// All characters in source order.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.source
    }

    /// Lists every character outside the operator alphabet.
    #[must_use]
    pub fn validate(&self) -> Vec<InvalidCharacter> {
        validate(self)
    }
}

impl From<&str> for Program {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.iter().try_for_each(|c| fmt::Write::write_char(f, *c))
    }
}

/// A character rejected by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InvalidCharacter {
    /// Character index into the program.
    pub index: usize,
    /// Offending character.
    pub character: char,
}

impl From<InvalidCharacter> for SyntaxError {
    fn from(invalid: InvalidCharacter) -> Self {
        Self::InvalidCharacter {
            index: invalid.index,
            character: invalid.character,
        }
    }
}

/// Reports every character outside the operator alphabet, in source order.
///
/// An empty list means the program only uses operators. Bracket balance is
/// not checked here; the compiler does that.
#[must_use]
pub fn validate(program: &Program) -> Vec<InvalidCharacter> {
    program
        .chars()
        .iter()
        .enumerate()
        .filter(|(_, character)| !is_operator(**character))
        .map(|(index, character)| InvalidCharacter {
            index,
            character: *character,
        })
        .collect()
}
