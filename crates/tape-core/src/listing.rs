//! Compile report: fusion statistics, instruction listing, and jump table.

#![allow(clippy::cast_precision_loss)]

use std::fmt;

use crate::{is_operator, CompiledProgram, Opcode, Program};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One compiled instruction in listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListingRow {
    /// Instruction index.
    pub index: usize,
    /// Source character index the instruction starts at.
    pub source_offset: usize,
    /// Operation tag.
    pub opcode: Opcode,
    /// Repetition count or jump target.
    pub operand: Option<usize>,
}

impl fmt::Display for ListingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.opcode.symbol();
        match self.operand {
            Some(operand) => write!(f, "{:3}: {symbol} {operand}", self.index),
            None => write!(f, "{:3}: {symbol}", self.index),
        }
    }
}

/// A jump instruction and the partner it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JumpEntry {
    /// Index of the jump instruction.
    pub index: usize,
    /// `JumpIfZero` or `JumpIfNonZero`.
    pub opcode: Opcode,
    /// Index of the partner instruction.
    pub target: usize,
}

/// Summary of what compilation did to a program.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompileReport {
    /// Operator characters in the source.
    pub original_ops: usize,
    /// Instructions after fusion.
    pub compiled_ops: usize,
    /// Operators absorbed by fusion.
    pub saved_ops: usize,
    /// Every instruction in order.
    pub rows: Vec<ListingRow>,
    /// Every jump instruction in order.
    pub jumps: Vec<JumpEntry>,
}

impl CompileReport {
    /// Builds the report for `compiled`, which must come from `program`.
    #[must_use]
    pub fn new(program: &Program, compiled: &CompiledProgram) -> Self {
        let rows: Vec<ListingRow> = compiled
            .instructions()
            .iter()
            .enumerate()
            .map(|(index, instruction)| ListingRow {
                index,
                source_offset: compiled.source_offset(index).unwrap_or(0),
                opcode: instruction.opcode(),
                operand: instruction.operand(),
            })
            .collect();

        let jumps = compiled
            .instructions()
            .iter()
            .enumerate()
            .filter_map(|(index, instruction)| {
                instruction.jump_target().map(|target| JumpEntry {
                    index,
                    opcode: instruction.opcode(),
                    target,
                })
            })
            .collect();

        Self {
            original_ops: program.chars().iter().filter(|c| is_operator(**c)).count(),
            compiled_ops: compiled.len(),
            saved_ops: compiled.fused_savings(),
            rows,
            jumps,
        }
    }

    /// Share of source operators removed by fusion, in percent.
    #[must_use]
    pub fn efficiency_percent(&self) -> f64 {
        if self.original_ops == 0 {
            0.0
        } else {
            self.saved_ops as f64 / self.original_ops as f64 * 100.0
        }
    }
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(40);
        writeln!(f, "Original operations: {}", self.original_ops)?;
        writeln!(f, "Compiled operations: {}", self.compiled_ops)?;
        writeln!(f, "Operations saved by optimization: {}", self.saved_ops)?;
        writeln!(f, "Efficiency improvement: {:.1}%", self.efficiency_percent())?;
        writeln!(f)?;
        writeln!(f, "Compiled instructions:")?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }

        if !self.jumps.is_empty() {
            writeln!(f)?;
            writeln!(f, "Jump table ({} pairs):", self.jumps.len())?;
            writeln!(f, "{rule}")?;
            for jump in &self.jumps {
                writeln!(
                    f,
                    "{:3}: {} -> {}",
                    jump.index,
                    jump.opcode.symbol(),
                    jump.target
                )?;
            }
        }
        Ok(())
    }
}
