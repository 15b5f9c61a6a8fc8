//! Errors raised by validation, compilation and execution.

use std::fmt;

use thiserror::Error;

/// Error classes used by hosts for reporting and exit-status policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ErrorClass {
    /// Source text is not a well-formed program.
    Syntax,
    /// Compile or run requested without a loaded program.
    Program,
    /// Pointer left the tape under the `Error` pointer behavior.
    Pointer,
    /// Cell left `0..=255` under the `Error` cell behavior.
    Cell,
}

/// Tape edge a pointer move ran off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Below index zero.
    Left,
    /// At or beyond the tape length.
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Malformed-program conditions found by validation, compilation, or live
/// bracket scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SyntaxError {
    /// A `[` has no matching `]`.
    #[error("unmatched '['")]
    UnmatchedOpen,
    /// A `]` has no open `[` to close.
    #[error("unmatched ']'")]
    UnmatchedClose,
    /// A character outside the operator alphabet.
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter {
        /// Character index into the program source.
        index: usize,
        /// Offending character.
        character: char,
    },
}

/// Every failure raised by the core. Errors are fail-fast: side effects of
/// instructions completed before the failure are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TapeError {
    /// Program text is malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// Compile or run requested with no program loaded.
    #[error("no program loaded")]
    EmptyProgram,
    /// Pointer left the tape under [`crate::PointerBehavior::Error`].
    #[error("pointer ran off the {direction} edge of the tape (attempted index {attempted})")]
    PointerOverflow {
        /// Edge that was crossed.
        direction: Direction,
        /// First out-of-range pointer value.
        attempted: i64,
    },
    /// Cell left `0..=255` under [`crate::CellBehavior::Error`].
    #[error("cell {cell_index} left the range 0..=255 (attempted value {attempted})")]
    CellOverflow {
        /// Index of the cell being written.
        cell_index: usize,
        /// First out-of-range value.
        attempted: i64,
    },
}

impl TapeError {
    /// Returns the reporting class for this error.
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::Syntax(_) => ErrorClass::Syntax,
            Self::EmptyProgram => ErrorClass::Program,
            Self::PointerOverflow { .. } => ErrorClass::Pointer,
            Self::CellOverflow { .. } => ErrorClass::Cell,
        }
    }

    /// Errors that can only be raised while instructions are executing.
    #[must_use]
    pub const fn is_runtime(self) -> bool {
        matches!(
            self,
            Self::PointerOverflow { .. } | Self::CellOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, ErrorClass, SyntaxError, TapeError};

    #[test]
    fn class_mapping_matches_error_taxonomy() {
        assert_eq!(
            TapeError::from(SyntaxError::UnmatchedOpen).class(),
            ErrorClass::Syntax
        );
        assert_eq!(TapeError::EmptyProgram.class(), ErrorClass::Program);
        assert_eq!(
            TapeError::PointerOverflow {
                direction: Direction::Left,
                attempted: -1
            }
            .class(),
            ErrorClass::Pointer
        );
        assert_eq!(
            TapeError::CellOverflow {
                cell_index: 0,
                attempted: 256
            }
            .class(),
            ErrorClass::Cell
        );
    }

    #[test]
    fn only_policy_violations_are_runtime_errors() {
        assert!(!TapeError::EmptyProgram.is_runtime());
        assert!(!TapeError::Syntax(SyntaxError::UnmatchedClose).is_runtime());
        assert!(TapeError::CellOverflow {
            cell_index: 3,
            attempted: -1
        }
        .is_runtime());
    }

    #[test]
    fn messages_carry_index_and_attempted_value() {
        let invalid = TapeError::from(SyntaxError::InvalidCharacter {
            index: 4,
            character: 'x',
        });
        assert_eq!(invalid.to_string(), "invalid character 'x' at index 4");

        let pointer = TapeError::PointerOverflow {
            direction: Direction::Right,
            attempted: 30_000,
        };
        assert_eq!(
            pointer.to_string(),
            "pointer ran off the right edge of the tape (attempted index 30000)"
        );
    }
}
