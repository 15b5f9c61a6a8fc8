//! Single-pass translation from program text to fused, jump-resolved
//! instructions.

use std::fmt;

use tracing::debug;

use crate::{Opcode, Program, SyntaxError, TapeError};

/// One compiled unit.
///
/// Move and arithmetic variants carry a repetition count (always at least 1);
/// jump variants carry the index of their partner instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Instruction {
    MoveRight(usize),
    MoveLeft(usize),
    Increment(usize),
    Decrement(usize),
    Output,
    Input,
    JumpIfZero(usize),
    JumpIfNonZero(usize),
}

impl Instruction {
    /// Operation tag.
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::MoveRight(_) => Opcode::MoveRight,
            Self::MoveLeft(_) => Opcode::MoveLeft,
            Self::Increment(_) => Opcode::Increment,
            Self::Decrement(_) => Opcode::Decrement,
            Self::Output => Opcode::Output,
            Self::Input => Opcode::Input,
            Self::JumpIfZero(_) => Opcode::JumpIfZero,
            Self::JumpIfNonZero(_) => Opcode::JumpIfNonZero,
        }
    }

    /// Repetition count or jump target; `None` for output and input.
    #[must_use]
    pub const fn operand(self) -> Option<usize> {
        match self {
            Self::MoveRight(n)
            | Self::MoveLeft(n)
            | Self::Increment(n)
            | Self::Decrement(n)
            | Self::JumpIfZero(n)
            | Self::JumpIfNonZero(n) => Some(n),
            Self::Output | Self::Input => None,
        }
    }

    /// How many source operators this instruction stands for.
    #[must_use]
    pub const fn repeat(self) -> usize {
        match self {
            Self::MoveRight(n) | Self::MoveLeft(n) | Self::Increment(n) | Self::Decrement(n) => n,
            _ => 1,
        }
    }

    /// Resolved partner index for jump instructions.
    #[must_use]
    pub const fn jump_target(self) -> Option<usize> {
        match self {
            Self::JumpIfZero(target) | Self::JumpIfNonZero(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.opcode().symbol();
        match self {
            Self::JumpIfZero(target) | Self::JumpIfNonZero(target) => {
                write!(f, "{symbol} -> {target}")
            }
            Self::Output | Self::Input => write!(f, "{symbol}"),
            _ => write!(f, "{symbol} {}", self.repeat()),
        }
    }
}

/// Compiled instruction sequence with the source position of each
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CompiledProgram {
    instructions: Vec<Instruction>,
    source_offsets: Vec<usize>,
}

impl CompiledProgram {
    /// Instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` when there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Instruction> {
        self.instructions.get(index).copied()
    }

    /// Source character index of the first operator folded into instruction
    /// `index`.
    #[must_use]
    pub fn source_offset(&self, index: usize) -> Option<usize> {
        self.source_offsets.get(index).copied()
    }

    /// Operators absorbed by run-length fusion.
    #[must_use]
    pub fn fused_savings(&self) -> usize {
        self.instructions
            .iter()
            .map(|instruction| instruction.repeat() - 1)
            .sum()
    }
}

/// Compiles `program` into a fused, jump-resolved instruction sequence.
///
/// # Errors
///
/// - [`TapeError::EmptyProgram`] when `program` has no characters.
/// - [`SyntaxError::InvalidCharacter`] for the first character outside the
///   operator alphabet.
/// - [`SyntaxError::UnmatchedClose`] for a `]` with no open `[`.
/// - [`SyntaxError::UnmatchedOpen`] when a `[` is still open at the end.
pub fn compile(program: &Program) -> Result<CompiledProgram, TapeError> {
    if program.is_empty() {
        return Err(TapeError::EmptyProgram);
    }
    if let Some(invalid) = program.validate().first() {
        return Err(SyntaxError::from(*invalid).into());
    }

    let source = program.chars();
    let mut instructions = Vec::with_capacity(source.len());
    let mut source_offsets = Vec::with_capacity(source.len());
    let mut open_brackets: Vec<usize> = Vec::new();
    let mut index = 0;

    while index < source.len() {
        let symbol = source[index];
        let opcode = Opcode::from_symbol(symbol).ok_or(SyntaxError::InvalidCharacter {
            index,
            character: symbol,
        })?;
        let start = index;
        let run = if opcode.is_fusable() {
            source[index..]
                .iter()
                .take_while(|candidate| **candidate == symbol)
                .count()
        } else {
            1
        };
        index += run - 1;

        let instruction = match opcode {
            Opcode::JumpIfZero => {
                open_brackets.push(instructions.len());
                // Patched when the matching close is reached.
                Instruction::JumpIfZero(usize::MAX)
            }
            Opcode::JumpIfNonZero => {
                let open = open_brackets.pop().ok_or(SyntaxError::UnmatchedClose)?;
                instructions[open] = Instruction::JumpIfZero(instructions.len());
                Instruction::JumpIfNonZero(open)
            }
            Opcode::Output => Instruction::Output,
            Opcode::Input => Instruction::Input,
            Opcode::MoveRight => Instruction::MoveRight(run),
            Opcode::MoveLeft => Instruction::MoveLeft(run),
            Opcode::Increment => Instruction::Increment(run),
            Opcode::Decrement => Instruction::Decrement(run),
        };

        instructions.push(instruction);
        source_offsets.push(start);
        index += 1;
    }

    if !open_brackets.is_empty() {
        return Err(SyntaxError::UnmatchedOpen.into());
    }

    let compiled = CompiledProgram {
        instructions,
        source_offsets,
    };
    debug!(
        source_len = program.len(),
        instructions = compiled.len(),
        fused = compiled.fused_savings(),
        "program compiled"
    );
    Ok(compiled)
}
