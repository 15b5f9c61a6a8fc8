//! Boundary rules for pointer motion and cell arithmetic.
//!
//! Both axes resolve a proposed value into a [`GateOutcome`]. Under the
//! `Error` variants a rejected update still names the boundary value that a
//! sequence of single-unit updates would have reached before failing, so a
//! fused `+++++` fails with exactly the state five separate `+` would leave.

#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::num::NonZeroUsize;

use crate::{Direction, TapeError};

/// Largest value a cell may hold under the `Wrap` and `Error` behaviors.
pub const CELL_MAX: i64 = 255;
/// Modulus used when folding cell values.
pub const CELL_MODULUS: i64 = CELL_MAX + 1;

/// What a gate decided for a proposed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// Store the value.
    Store(T),
    /// Store `boundary`, then fail with `error`.
    Reject {
        /// Last in-range value reached before the violation.
        boundary: T,
        /// Violation to report.
        error: TapeError,
    },
}

/// Pointer motion at the tape edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PointerBehavior {
    /// Saturate at `0` and `size - 1`.
    #[default]
    Clamp,
    /// Wrap modulo the tape size.
    Wrap,
    /// Fail on any out-of-range move.
    Error,
}

impl PointerBehavior {
    /// Resolves a move of `delta` cells from `pointer` on a tape of `size`
    /// cells.
    #[must_use]
    pub fn resolve(self, pointer: usize, delta: i64, size: NonZeroUsize) -> GateOutcome<usize> {
        let size = size.get() as i64;
        let target = (pointer as i64).saturating_add(delta);

        match self {
            Self::Clamp => GateOutcome::Store(target.clamp(0, size - 1) as usize),
            Self::Wrap => GateOutcome::Store(target.rem_euclid(size) as usize),
            Self::Error if target < 0 => GateOutcome::Reject {
                boundary: 0,
                error: TapeError::PointerOverflow {
                    direction: Direction::Left,
                    attempted: -1,
                },
            },
            Self::Error if target >= size => GateOutcome::Reject {
                boundary: (size - 1) as usize,
                error: TapeError::PointerOverflow {
                    direction: Direction::Right,
                    attempted: size,
                },
            },
            Self::Error => GateOutcome::Store(target as usize),
        }
    }

    /// Short lowercase name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Wrap => "wrap",
            Self::Error => "error",
        }
    }
}

/// A proposed write to the current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellWrite {
    /// Add a signed amount (fused `+`/`-`).
    Add(i64),
    /// Replace the value (input).
    Set(i64),
}

/// Cell arithmetic at the byte boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CellBehavior {
    /// Fold every stored value into `0..=255`.
    #[default]
    Wrap,
    /// Store values unchanged; fold only when producing output.
    Unlimited,
    /// Fail if a write would leave `0..=255`.
    Error,
}

impl CellBehavior {
    /// Resolves `write` against the `current` value of cell `cell_index`.
    #[must_use]
    pub fn resolve(self, cell_index: usize, current: i64, write: CellWrite) -> GateOutcome<i64> {
        let proposed = match write {
            CellWrite::Add(delta) => current.saturating_add(delta),
            CellWrite::Set(value) => value,
        };

        match self {
            Self::Wrap => GateOutcome::Store(proposed.rem_euclid(CELL_MODULUS)),
            Self::Unlimited => GateOutcome::Store(proposed),
            Self::Error if (0..=CELL_MAX).contains(&proposed) => GateOutcome::Store(proposed),
            Self::Error => {
                let (boundary, attempted) = match write {
                    CellWrite::Set(value) => (current, value),
                    CellWrite::Add(_) if !(0..=CELL_MAX).contains(&current) => {
                        (current, current.saturating_add(proposed.signum()))
                    }
                    CellWrite::Add(_) if proposed > CELL_MAX => (CELL_MAX, CELL_MODULUS),
                    CellWrite::Add(_) => (0, -1),
                };
                GateOutcome::Reject {
                    boundary,
                    error: TapeError::CellOverflow {
                        cell_index,
                        attempted,
                    },
                }
            }
        }
    }

    /// Folds a stored value to the byte emitted by an output instruction.
    ///
    /// Out-of-range values held under `Unlimited` are clamped; everything
    /// else is reduced modulo 256.
    #[must_use]
    pub const fn output_byte(self, value: i64) -> u8 {
        match self {
            Self::Unlimited if value < 0 => 0,
            Self::Unlimited if value > CELL_MAX => u8::MAX,
            _ => value.rem_euclid(CELL_MODULUS) as u8,
        }
    }

    /// Short lowercase name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wrap => "wrap",
            Self::Unlimited => "unlimited",
            Self::Error => "error",
        }
    }
}

/// Pointer and cell rules in force for a run. Survives interpreter reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BehaviorPolicy {
    /// Pointer boundary rule.
    pub pointer: PointerBehavior,
    /// Cell boundary rule.
    pub cell: CellBehavior,
}

impl BehaviorPolicy {
    /// Builds a policy from its two axes.
    #[must_use]
    pub const fn new(pointer: PointerBehavior, cell: CellBehavior) -> Self {
        Self { pointer, cell }
    }
}
