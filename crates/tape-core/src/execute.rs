//! Instruction semantics shared by every execution strategy.
//!
//! [`execute_op`] is the only place an opcode's effect is defined. Single-step
//! execution feeds it one source character at a time and resolves taken jumps
//! by scanning the source; the bulk and chunked strategies feed it compiled
//! instructions through [`run_compiled`] and resolve jumps from the compiled
//! targets. The strategies differ only in where they suspend.

use std::num::NonZeroU64;

use tracing::trace;

use crate::{
    BehaviorPolicy, CellWrite, CompiledProgram, Instruction, IoChannel, Opcode, Program,
    SyntaxError, Tape, TapeError,
};

/// Mutable run resources: the tape and the I/O channel.
#[derive(Debug, Default)]
pub struct Machine {
    /// Memory tape.
    pub tape: Tape,
    /// Output accumulator and input queue.
    pub io: IoChannel,
}

impl Machine {
    /// Creates a machine around an existing tape with an empty channel.
    #[must_use]
    pub fn new(tape: Tape) -> Self {
        Self {
            tape,
            io: IoChannel::new(),
        }
    }
}

/// Control-flow decision after one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Fall through to the next instruction.
    Continue,
    /// The jump condition held; transfer to the partner bracket.
    Branch,
}

/// Applies `opcode` repeated `repeat` times to `machine` under `policy`.
///
/// Jumps never move anything themselves; they report [`Flow::Branch`] when
/// their condition holds and the caller resolves the destination.
///
/// # Errors
///
/// Propagates [`TapeError::PointerOverflow`] and [`TapeError::CellOverflow`]
/// from the tape gates. Effects of earlier instructions are kept.
pub fn execute_op(
    opcode: Opcode,
    repeat: usize,
    machine: &mut Machine,
    policy: BehaviorPolicy,
) -> Result<Flow, TapeError> {
    let amount = i64::try_from(repeat).unwrap_or(i64::MAX);

    match opcode {
        Opcode::MoveRight => machine.tape.move_pointer(amount, policy.pointer)?,
        Opcode::MoveLeft => machine.tape.move_pointer(-amount, policy.pointer)?,
        Opcode::Increment => machine
            .tape
            .modify_cell(CellWrite::Add(amount), policy.cell)?,
        Opcode::Decrement => machine
            .tape
            .modify_cell(CellWrite::Add(-amount), policy.cell)?,
        Opcode::Output => {
            let byte = policy.cell.output_byte(machine.tape.current());
            machine.io.push_output(byte);
        }
        Opcode::Input => {
            let value = machine.io.next_input();
            machine.tape.modify_cell(CellWrite::Set(value), policy.cell)?;
        }
        Opcode::JumpIfZero if machine.tape.current() == 0 => return Ok(Flow::Branch),
        Opcode::JumpIfNonZero if machine.tape.current() != 0 => return Ok(Flow::Branch),
        Opcode::JumpIfZero | Opcode::JumpIfNonZero => {}
    }

    Ok(Flow::Continue)
}

/// Executes compiled instruction `pc` and returns the next program counter.
///
/// # Errors
///
/// Same as [`execute_op`].
pub fn execute_instruction(
    instruction: Instruction,
    pc: usize,
    machine: &mut Machine,
    policy: BehaviorPolicy,
) -> Result<usize, TapeError> {
    let landing = match execute_op(instruction.opcode(), instruction.repeat(), machine, policy)? {
        Flow::Branch => instruction.jump_target().unwrap_or(pc),
        Flow::Continue => pc,
    };
    Ok(landing + 1)
}

/// Finds the bracket matching the one at `index` by scanning the source and
/// counting nesting depth.
///
/// Non-bracket positions return `index` unchanged.
///
/// # Errors
///
/// [`SyntaxError::UnmatchedOpen`] when a forward scan runs off the end and
/// [`SyntaxError::UnmatchedClose`] when a backward scan runs off the start.
pub fn matching_bracket(program: &Program, index: usize) -> Result<usize, SyntaxError> {
    let forward = match program.get(index) {
        Some('[') => true,
        Some(']') => false,
        _ => return Ok(index),
    };

    let mut depth = 1_usize;
    let mut position = index;
    while depth > 0 {
        position = if forward {
            position + 1
        } else {
            position.checked_sub(1).ok_or(SyntaxError::UnmatchedClose)?
        };
        let symbol = program.get(position).ok_or(SyntaxError::UnmatchedOpen)?;
        match (symbol, forward) {
            ('[', true) | (']', false) => depth += 1,
            (']', true) | ('[', false) => depth -= 1,
            _ => {}
        }
    }
    Ok(position)
}

/// Resumable position of a compiled run.
///
/// Created by the caller and handed to every chunked call, so independent
/// runs never share progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ResumeCursor {
    pc: usize,
    steps: u64,
}

impl ResumeCursor {
    /// A cursor at the first instruction with no steps taken.
    #[must_use]
    pub const fn new() -> Self {
        Self { pc: 0, steps: 0 }
    }

    /// Index of the next compiled instruction to execute.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed through this cursor so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }
}

/// Why a compiled run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ChunkStatus {
    /// Chunk quota used up; more work remains.
    Suspended,
    /// Program counter ran past the last instruction.
    Halted,
    /// Cumulative step ceiling reached.
    StepLimit,
}

/// Executes compiled instructions from `cursor` until the program ends, the
/// cumulative `step_ceiling` is reached, or `chunk_limit` instructions ran in
/// this call.
///
/// # Errors
///
/// Same as [`execute_op`]. The cursor stays on the failing instruction.
pub fn run_compiled(
    compiled: &CompiledProgram,
    machine: &mut Machine,
    policy: BehaviorPolicy,
    cursor: &mut ResumeCursor,
    chunk_limit: NonZeroU64,
    step_ceiling: u64,
) -> Result<ChunkStatus, TapeError> {
    let mut executed = 0_u64;

    let status = loop {
        let Some(instruction) = compiled.get(cursor.pc) else {
            break ChunkStatus::Halted;
        };
        if cursor.steps >= step_ceiling {
            break ChunkStatus::StepLimit;
        }
        if executed >= chunk_limit.get() {
            break ChunkStatus::Suspended;
        }

        cursor.pc = execute_instruction(instruction, cursor.pc, machine, policy)?;
        cursor.steps += 1;
        executed += 1;
    };

    trace!(executed, pc = cursor.pc, steps = cursor.steps, ?status, "compiled run returned");
    Ok(status)
}
