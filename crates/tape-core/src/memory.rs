//! Fixed-length cell tape and its pointer.
//!
//! The pointer and the cells are private: every mutation goes through
//! [`Tape::move_pointer`] or [`Tape::modify_cell`], which apply the active
//! [`crate::BehaviorPolicy`] axis.

use std::num::NonZeroUsize;

use crate::{CellBehavior, CellWrite, GateOutcome, PointerBehavior, TapeError};

/// Default number of cells on a fresh tape.
pub const DEFAULT_MEMORY_SIZE: NonZeroUsize = match NonZeroUsize::new(30_000) {
    Some(size) => size,
    None => panic!("default tape size must be non-zero"),
};

/// Tape of integer cells plus the pointer selecting the active cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Tape {
    cells: Box<[i64]>,
    pointer: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_SIZE)
    }
}

impl Tape {
    /// Allocates a zeroed tape with the pointer on cell 0.
    #[must_use]
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            cells: vec![0; size.get()].into_boxed_slice(),
            pointer: 0,
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cells.len()).unwrap_or(NonZeroUsize::MIN)
    }

    /// Index of the active cell.
    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Value of the active cell.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.cells[self.pointer]
    }

    /// All cells in index order.
    #[must_use]
    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    /// Moves the pointer by `delta` cells.
    ///
    /// # Errors
    ///
    /// Returns [`TapeError::PointerOverflow`] under
    /// [`PointerBehavior::Error`] when the move leaves the tape. The pointer is
    /// left on the edge it crossed.
    pub fn move_pointer(&mut self, delta: i64, behavior: PointerBehavior) -> Result<(), TapeError> {
        match behavior.resolve(self.pointer, delta, self.size()) {
            GateOutcome::Store(pointer) => {
                self.pointer = pointer;
                Ok(())
            }
            GateOutcome::Reject { boundary, error } => {
                self.pointer = boundary;
                Err(error)
            }
        }
    }

    /// Applies `write` to the active cell.
    ///
    /// # Errors
    ///
    /// Returns [`TapeError::CellOverflow`] under [`CellBehavior::Error`] when
    /// the value would leave `0..=255`. The cell keeps the last in-range value
    /// reached.
    pub fn modify_cell(
        &mut self,
        write: CellWrite,
        behavior: CellBehavior,
    ) -> Result<(), TapeError> {
        let index = self.pointer;
        match behavior.resolve(index, self.cells[index], write) {
            GateOutcome::Store(value) => {
                self.cells[index] = value;
                Ok(())
            }
            GateOutcome::Reject { boundary, error } => {
                self.cells[index] = boundary;
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::{Tape, DEFAULT_MEMORY_SIZE};
    use crate::{CellBehavior, CellWrite, Direction, PointerBehavior, TapeError};

    #[test]
    fn default_tape_is_zeroed_with_pointer_at_origin() {
        let tape = Tape::default();
        assert_eq!(tape.size(), DEFAULT_MEMORY_SIZE);
        assert_eq!(tape.cells().len(), 30_000);
        assert_eq!(tape.pointer(), 0);
        assert!(tape.cells().iter().all(|cell| *cell == 0));
    }

    #[test]
    fn pointer_boundary_law_holds_for_each_behavior() {
        let mut tape = Tape::default();
        tape.move_pointer(-1, PointerBehavior::Clamp).expect("clamp never fails");
        assert_eq!(tape.pointer(), 0);

        tape.move_pointer(-1, PointerBehavior::Wrap).expect("wrap never fails");
        assert_eq!(tape.pointer(), 29_999);

        let mut tape = Tape::default();
        assert_eq!(
            tape.move_pointer(-1, PointerBehavior::Error),
            Err(TapeError::PointerOverflow {
                direction: Direction::Left,
                attempted: -1,
            })
        );
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn modify_cell_targets_only_the_active_cell() {
        let mut tape = Tape::new(NonZeroUsize::new(4).expect("non-zero"));
        tape.move_pointer(2, PointerBehavior::Clamp).expect("in range");
        tape.modify_cell(CellWrite::Add(7), CellBehavior::Wrap).expect("wrap never fails");

        assert_eq!(tape.cells(), &[0, 0, 7, 0]);
        assert_eq!(tape.current(), 7);
    }

    #[test]
    fn rejected_cell_write_keeps_the_boundary_value() {
        let mut tape = Tape::default();
        tape.modify_cell(CellWrite::Add(250), CellBehavior::Error).expect("in range");

        let result = tape.modify_cell(CellWrite::Add(10), CellBehavior::Error);

        assert_eq!(
            result,
            Err(TapeError::CellOverflow {
                cell_index: 0,
                attempted: 256,
            })
        );
        assert_eq!(tape.current(), 255);
    }
}
